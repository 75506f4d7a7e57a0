//! Search algorithms and move ordering.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use farchess_core::{Board, Move};
use tracing::debug;

use control::SearchControl;
use negamax::{aspiration_search, SearchContext, INF, MAX_PLY};
use tt::TranspositionTable;

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found at the highest completed depth; `None` means the
    /// root position has no legal move (checkmate or stalemate) or the
    /// search was stopped before its first iteration completed.
    pub best_move: Option<Move>,
    /// Second move in the PV, the expected reply.
    pub ponder_move: Option<Move>,
    /// Full principal variation line.
    pub pv: Vec<Move>,
    /// Evaluation score in centipawns from the side-to-move's perspective.
    pub score: i32,
    /// Total nodes visited during the search.
    pub nodes: u64,
    /// Depth reached.
    pub depth: u8,
}

/// Iterative-deepening searcher holding its own transposition table across
/// calls to [`Self::search`]; heuristic tables (killers, history, counters,
/// continuation history) are rebuilt fresh at the start of every call, as if
/// each call were an independent search from scratch.
pub struct Searcher {
    tt: TranspositionTable,
}

impl Searcher {
    /// Create a fresh searcher with a 16 MiB transposition table.
    pub fn new() -> Self {
        Searcher { tt: TranspositionTable::new(16) }
    }

    /// Clear the transposition table (preserving the allocation).
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Resize the transposition table to the given size in megabytes,
    /// discarding its contents.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    /// Run iterative-deepening search on `board` up to `max_depth`, calling
    /// `on_iter(depth, score, nodes, pv)` after each completed iteration so
    /// the caller can report progress before the next one starts.
    ///
    /// `board` is threaded by make/unmake throughout search and is restored
    /// to its original position by the time this returns, whether or not
    /// `control` stopped it early. Caller is responsible for activating
    /// `control`'s clock (immediately for a timed search, on ponderhit for
    /// a pondering one) before or during the call.
    pub fn search<F>(&mut self, board: &mut Board, max_depth: u8, control: &SearchControl, mut on_iter: F) -> SearchResult
    where
        F: FnMut(u8, i32, u64, &[Move]),
    {
        self.tt.new_generation();

        let mut ctx = SearchContext::new(&mut self.tt, control);

        let mut completed_move: Option<Move> = None;
        let mut completed_score = -INF;
        let mut completed_depth: u8 = 0;
        let mut completed_pv: Vec<Move> = Vec::new();
        let mut prev_score: i32 = 0;

        for depth in 1..=max_depth {
            if control.should_stop_iterating() {
                break;
            }

            ctx.killers.clear();
            ctx.counters.clear();
            ctx.cont_hist.clear();
            ctx.history.decay();

            let score = aspiration_search(board, i32::from(depth), prev_score, &mut ctx);

            if ctx.aborted {
                break;
            }

            prev_score = score;

            let pv = ctx.pv.root_pv();
            completed_move = pv.first().cloned();
            completed_score = score;
            completed_depth = depth;
            completed_pv = pv;

            debug!(depth, score, nodes = ctx.nodes, "completed search iteration");
            on_iter(depth, score, ctx.nodes, &completed_pv);
        }

        let ponder_move = if completed_pv.len() > 1 { Some(completed_pv[1].clone()) } else { None };

        SearchResult {
            best_move: completed_move,
            ponder_move,
            pv: completed_pv,
            score: completed_score,
            nodes: ctx.nodes,
            depth: completed_depth,
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher").finish_non_exhaustive()
    }
}
