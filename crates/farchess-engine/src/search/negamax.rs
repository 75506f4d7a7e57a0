//! Negamax alpha-beta search: quiescence, PVS with LMR, null-move and
//! futility/razoring pruning, mate-distance pruning, and a triangular PV
//! table. ProbCut, SEE-based pruning, singular extensions, and correction
//! history are not among the techniques this search carries, and internal
//! iterative reduction is folded into plain TT-less move ordering rather
//! than kept as a separate step.
//!
//! An unbounded board can't be copied cheaply (see the board model's own
//! design note), so this negamax threads one `&mut Board` through the whole
//! tree via make/unmake, the same idiom `exec::simulate_prebuilt`/`perft`
//! already use.

use farchess_core::{
    build_move, calculate, is_square_attacked, make_move, make_null_move, rewind_move, rewind_null_move, Board,
    Change, Coord, Move, MoveKind, MovesetQuery, Player, RawType,
};

use crate::eval::evaluate;
use crate::search::control::SearchControl;
use crate::search::heuristics::{ContinuationHistory, CounterMoveTable, HistoryTable, KillerTable};
use crate::search::ordering::{move_key, MovePicker, COUNTER_SCORE, KILLER_SCORE, TT_MOVE_SCORE};
use crate::search::tt::{Bound, TranspositionTable};

/// Plies of search history a killer/continuation table needs to size for.
pub const MAX_PLY: usize = 64;

pub const INF: i32 = 30_000;
pub const MATE_SCORE: i32 = 29_000;
pub const MATE_THRESHOLD: i32 = 28_000;

const FUTILITY_MARGIN: [i32; 4] = [0, 200, 450, 700];
const RFP_MARGIN: [i32; 4] = [0, 200, 450, 700];
const RAZOR_MARGIN: [i32; 4] = [0, 300, 550, 900];
const QSEARCH_DELTA_MARGIN: i32 = 150;

/// One recursive call's search parameters: depth remaining, ply from the
/// root (for mate scoring and table sizing), and whether a null move is
/// still allowed at this node (cleared for the node right after one, so
/// search never tries two null moves in a row).
#[derive(Debug, Clone, Copy)]
pub struct NodeParams {
    pub depth: i32,
    pub ply: usize,
    pub do_null: bool,
}

/// Triangular PV table: `table[ply]` holds the best line found so far from
/// `ply` to the end of search.
pub struct PvTable {
    table: Vec<Vec<Move>>,
    length: Vec<usize>,
}

impl PvTable {
    pub fn new() -> Self {
        PvTable { table: (0..MAX_PLY).map(|_| Vec::new()).collect(), length: vec![0; MAX_PLY] }
    }

    pub fn clear_ply(&mut self, ply: usize) {
        if let Some(len) = self.length.get_mut(ply) {
            *len = 0;
        }
    }

    fn update(&mut self, ply: usize, mv: Move) {
        if ply >= self.table.len() {
            return;
        }
        let mut line = vec![mv];
        if ply + 1 < self.length.len() {
            line.extend(self.table[ply + 1][..self.length[ply + 1]].iter().cloned());
        }
        self.length[ply] = line.len();
        self.table[ply] = line;
    }

    pub fn root_pv(&self) -> Vec<Move> {
        self.table.first().cloned().unwrap_or_default()
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a recursive search call needs that isn't part of the position
/// itself: node budget, ordering tables, the PV being built, and the sticky
/// abort flag — every recursive call returns an out-of-band value once this
/// is set, and the caller discards rather than trusts it.
pub struct SearchContext<'a> {
    pub nodes: u64,
    pub tt: &'a mut TranspositionTable,
    pub pv: PvTable,
    pub control: &'a SearchControl,
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub counters: CounterMoveTable,
    pub cont_hist: ContinuationHistory,
    pub stack: Vec<Option<(RawType, Coord)>>,
    pub position_history: Vec<u64>,
    pub aborted: bool,
}

impl<'a> SearchContext<'a> {
    pub fn new(tt: &'a mut TranspositionTable, control: &'a SearchControl) -> Self {
        SearchContext {
            nodes: 0,
            tt,
            pv: PvTable::new(),
            control,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            counters: CounterMoveTable::new(),
            cont_hist: ContinuationHistory::new(),
            stack: vec![None; MAX_PLY + 1],
            position_history: Vec::new(),
            aborted: false,
        }
    }
}

fn side_in_check(board: &Board, side: Player) -> bool {
    board.royals_of(side).iter().any(|&sq| is_square_attacked(board, sq, !side))
}

fn has_non_pawn_material(board: &Board, color: Player) -> bool {
    board.pieces_of(color).any(|p| !matches!(p.piece_type.get_raw(), RawType::Pawn | RawType::King))
}

/// Every legal move for the side to move, expanding promotion choices per
/// [`farchess_core::GameRules::promotions_allowed_for`] — the same loop
/// `perft` walks, minus the recursive descent.
pub(crate) fn legal_moves(board: &Board) -> Vec<Move> {
    let color = board.turn();
    let pieces: Vec<_> = board.pieces_of(color).copied().collect();
    let mut moves = Vec::new();
    for piece in pieces {
        let generated = calculate(board, &piece, MovesetQuery::default());
        for candidate in generated.all_candidates() {
            if candidate.promote_trigger {
                for &promo in board.rules().promotions_allowed_for(color) {
                    moves.push(build_move(board, &piece, &candidate, Some(promo)));
                }
            } else {
                moves.push(build_move(board, &piece, &candidate, None));
            }
        }
    }
    moves
}

fn lmr_reduction(depth: i32, move_number: usize) -> i32 {
    if depth < 3 || move_number < 4 {
        return 0;
    }
    let reduction = 1.0 + (depth as f64).ln() * (move_number as f64).ln() / 2.25;
    (reduction as i32).clamp(0, depth - 2)
}

/// Has `hash` repeated within the last `move_rule_counter` halfmoves of the
/// search path so far? A single repetition inside the tree is treated as a
/// draw (rather than waiting for a literal threefold) since the search
/// can't see whether a third instance lies further down a line it's about
/// to prune anyway — a standard search-time simplification of the game's
/// real threefold rule.
fn repeats_in_search_path(ctx: &SearchContext, board: &Board) -> bool {
    let history = &ctx.position_history;
    if history.len() < 2 {
        return false;
    }
    let prior = &history[..history.len() - 1];
    let limit = (board.move_rule_counter() as usize).min(prior.len());
    if limit == 0 {
        return false;
    }
    prior[prior.len() - limit..].contains(&board.hash())
}

/// Alpha-beta negamax over one ply, threading `board` through make/unmake
/// rather than cloning. Returns a score from the perspective of the side to
/// move at `params.ply`; once `ctx.aborted` is set the return value is a
/// sentinel the caller must not trust.
pub fn negamax(board: &mut Board, mut alpha: i32, mut beta: i32, params: NodeParams, ctx: &mut SearchContext) -> i32 {
    if ctx.aborted {
        return 0;
    }
    ctx.nodes += 1;
    if ctx.nodes % 2047 == 0 && ctx.control.should_stop(ctx.nodes) {
        ctx.aborted = true;
        return 0;
    }

    let ply = params.ply;
    ctx.pv.clear_ply(ply);

    if ply >= MAX_PLY {
        return evaluate(board);
    }

    let is_root = ply == 0;
    let is_pv = beta - alpha > 1;
    let color = board.turn();
    let in_check = side_in_check(board, color);

    if !is_root {
        if board.rules().move_rule != 0 && board.move_rule_counter() >= board.rules().move_rule {
            return 0;
        }
        if repeats_in_search_path(ctx, board) {
            return 0;
        }
        let mate_alpha = alpha.max(-MATE_SCORE + ply as i32);
        let mate_beta = beta.min(MATE_SCORE - ply as i32 - 1);
        if mate_alpha >= mate_beta {
            return mate_alpha;
        }
        alpha = mate_alpha;
        beta = mate_beta;
    }

    if params.depth <= 0 && !in_check {
        return qsearch(board, ply, alpha, beta, ctx);
    }

    let hash = board.hash();
    let mut tt_move: Option<Move> = None;
    if let Some(probe) = ctx.tt.probe(hash, ply as u8) {
        tt_move = probe.best_move.clone();
        if !is_pv && i32::from(probe.depth) >= params.depth {
            match probe.bound {
                Bound::Exact => return probe.score,
                Bound::LowerBound if probe.score >= beta => return probe.score,
                Bound::UpperBound if probe.score <= alpha => return probe.score,
                _ => {}
            }
        }
    }

    let static_eval = evaluate(board);

    if !in_check && !is_pv && params.depth > 0 {
        let margin_index = params.depth as usize;
        if margin_index < RFP_MARGIN.len() && beta.abs() < MATE_THRESHOLD && static_eval - RFP_MARGIN[margin_index] >= beta {
            return static_eval - RFP_MARGIN[margin_index];
        }
        if margin_index < RAZOR_MARGIN.len() && static_eval + RAZOR_MARGIN[margin_index] <= alpha {
            let razor_score = qsearch(board, ply, alpha, alpha + 1, ctx);
            if ctx.aborted {
                return 0;
            }
            if razor_score <= alpha {
                return razor_score;
            }
        }
        if params.do_null && params.depth >= 3 && static_eval >= beta && has_non_pawn_material(board, color) {
            let reduction = 3 + params.depth / 6;
            let undo = make_null_move(board);
            ctx.position_history.push(board.hash());
            let score = -negamax(
                board,
                -beta,
                -beta + 1,
                NodeParams { depth: params.depth - 1 - reduction, ply: ply + 1, do_null: false },
                ctx,
            );
            ctx.position_history.pop();
            rewind_null_move(board, undo);
            if ctx.aborted {
                return 0;
            }
            if score >= beta {
                return if score >= MATE_THRESHOLD { beta } else { score };
            }
        }
    }

    let moves = legal_moves(board);
    if moves.is_empty() {
        return if in_check { -MATE_SCORE + ply as i32 } else { 0 };
    }

    let prev = ctx.stack.get(ply).copied().flatten();
    let tt_key = tt_move.as_ref().map(move_key);
    let mut picker = {
        let killers = &ctx.killers;
        let history = &ctx.history;
        let counters = &ctx.counters;
        let cont_hist = &ctx.cont_hist;
        MovePicker::new(moves, |mv| {
            let key = move_key(mv);
            if Some(key) == tt_key {
                return TT_MOVE_SCORE;
            }
            if mv.is_capture || matches!(mv.kind, MoveKind::Promotion) {
                return 0;
            }
            let raw = mv.piece_type.get_raw();
            let mut score = 0;
            if killers.is_killer(ply, mv) {
                score += KILLER_SCORE;
            }
            if let Some((prev_raw, prev_to)) = prev {
                if counters.is_counter(prev_raw, prev_to, mv) {
                    score += COUNTER_SCORE;
                }
                score += cont_hist.score(prev_raw, prev_to, raw, mv.end);
            }
            score += history.score(raw, mv.end);
            score
        })
    };

    let futile = !in_check
        && !is_pv
        && params.depth > 0
        && (params.depth as usize) < FUTILITY_MARGIN.len()
        && static_eval + FUTILITY_MARGIN[params.depth as usize] <= alpha;

    let mut best_score = -INF;
    let mut best_move: Option<Move> = None;
    let mut raised_alpha = false;
    let mut move_number = 0usize;

    while let Some(mv) = picker.pick_next() {
        move_number += 1;
        let is_quiet = !mv.is_capture && !matches!(mv.kind, MoveKind::Promotion);

        if futile && is_quiet && move_number > 1 {
            continue;
        }

        if ctx.stack.len() <= ply + 1 {
            ctx.stack.resize(ply + 2, None);
        }
        ctx.stack[ply + 1] = Some((mv.piece_type.get_raw(), mv.end));

        make_move(board, mv.clone()).expect("internally generated move cannot desync");
        ctx.position_history.push(board.hash());

        let child_depth = params.depth - 1;
        let score = if move_number == 1 {
            -negamax(board, -beta, -alpha, NodeParams { depth: child_depth, ply: ply + 1, do_null: true }, ctx)
        } else {
            let reduction = if is_quiet { lmr_reduction(params.depth, move_number) } else { 0 };
            let reduced_depth = (child_depth - reduction).max(0);
            let mut s = -negamax(
                board,
                -alpha - 1,
                -alpha,
                NodeParams { depth: reduced_depth, ply: ply + 1, do_null: true },
                ctx,
            );
            if s > alpha && reduction > 0 && !ctx.aborted {
                s = -negamax(board, -alpha - 1, -alpha, NodeParams { depth: child_depth, ply: ply + 1, do_null: true }, ctx);
            }
            if s > alpha && s < beta && !ctx.aborted {
                s = -negamax(board, -beta, -alpha, NodeParams { depth: child_depth, ply: ply + 1, do_null: true }, ctx);
            }
            s
        };

        ctx.position_history.pop();
        rewind_move(board).expect("rewind of a move just made cannot fail");

        if ctx.aborted {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv.clone());
            if score > alpha {
                alpha = score;
                raised_alpha = true;
                ctx.pv.update(ply, mv.clone());
                if alpha >= beta {
                    if is_quiet {
                        let depth_u8 = params.depth.clamp(0, 255) as u8;
                        ctx.killers.store(ply, &mv);
                        ctx.history.update_good(mv.piece_type.get_raw(), mv.end, depth_u8);
                        if let Some((prev_raw, prev_to)) = prev {
                            ctx.counters.store(prev_raw, prev_to, &mv);
                            ctx.cont_hist.update_good(prev_raw, prev_to, mv.piece_type.get_raw(), mv.end, depth_u8);
                        }
                    }
                    break;
                }
            }
        } else if is_quiet {
            let depth_u8 = params.depth.clamp(0, 255) as u8;
            ctx.history.update_bad(mv.piece_type.get_raw(), mv.end, depth_u8);
        }
    }

    let bound = if best_score >= beta {
        Bound::LowerBound
    } else if raised_alpha {
        Bound::Exact
    } else {
        Bound::UpperBound
    };
    ctx.tt.store(hash, params.depth.clamp(0, 255) as u8, best_score, static_eval, best_move, bound, ply as u8);

    best_score
}

/// Quiescence search: resolve captures (and, when in check, every legal
/// evasion) until the position is quiet, so the main search never evaluates
/// a position mid-capture-sequence.
pub fn qsearch(board: &mut Board, ply: usize, mut alpha: i32, beta: i32, ctx: &mut SearchContext) -> i32 {
    if ctx.aborted {
        return 0;
    }
    ctx.nodes += 1;
    if ctx.nodes % 2047 == 0 && ctx.control.should_stop(ctx.nodes) {
        ctx.aborted = true;
        return 0;
    }
    if ply >= MAX_PLY {
        return evaluate(board);
    }

    let color = board.turn();
    let in_check = side_in_check(board, color);
    let mut best_score = -INF;

    if !in_check {
        let stand_pat = evaluate(board);
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        best_score = stand_pat;
    }

    let candidates: Vec<Move> = if in_check {
        legal_moves(board)
    } else {
        legal_moves(board)
            .into_iter()
            .filter(|mv| mv.is_capture || matches!(mv.kind, MoveKind::Promotion))
            .collect()
    };

    if candidates.is_empty() {
        return if in_check { -MATE_SCORE + ply as i32 } else { best_score };
    }

    let mut picker = MovePicker::new_qsearch(candidates);
    while let Some(mv) = picker.pick_next() {
        if !in_check && mv.is_capture {
            let victim_value = mv
                .changes
                .iter()
                .find_map(|c| match c {
                    Change::Capture { captured, .. } => Some(captured.piece_type.get_raw().material_value()),
                    _ => None,
                })
                .unwrap_or(0);
            if evaluate(board) + victim_value + QSEARCH_DELTA_MARGIN <= alpha {
                continue;
            }
        }

        make_move(board, mv.clone()).expect("internally generated move cannot desync");
        let score = -qsearch(board, ply + 1, -beta, -alpha, ctx);
        rewind_move(board).expect("rewind of a move just made cannot fail");

        if ctx.aborted {
            return 0;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    break;
                }
            }
        }
    }

    best_score
}

/// Iterative-deepening entry point used by [`super::Searcher`]: full window
/// for shallow depths or near-mate scores (aspiration windows pay off only
/// once the tree is deep enough that a re-search is rarer than the pruning
/// they buy), otherwise a narrow window around the previous iteration's
/// score that widens ×4 on each fail.
pub fn aspiration_search(board: &mut Board, depth: i32, prev_score: i32, ctx: &mut SearchContext) -> i32 {
    if depth <= 4 || prev_score.abs() >= MATE_THRESHOLD {
        return negamax(board, -INF, INF, NodeParams { depth, ply: 0, do_null: true }, ctx);
    }

    let mut window = 25;
    let mut alpha = (prev_score - window).max(-INF);
    let mut beta = (prev_score + window).min(INF);

    loop {
        let score = negamax(board, alpha, beta, NodeParams { depth, ply: 0, do_null: true }, ctx);
        if ctx.aborted {
            return score;
        }
        if score <= alpha {
            window *= 4;
            alpha = (prev_score - window).max(-INF);
        } else if score >= beta {
            window *= 4;
            beta = (prev_score + window).min(INF);
        } else {
            return score;
        }
        if window > 2_000 {
            return negamax(board, -INF, INF, NodeParams { depth, ply: 0, do_null: true }, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::control::SearchControl;
    use farchess_core::{GameRules, MoveDraft, PieceType};
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn fresh_context<'a>(tt: &'a mut TranspositionTable, control: &'a SearchControl) -> SearchContext<'a> {
        SearchContext::new(tt, control)
    }

    fn infinite_control() -> SearchControl {
        SearchControl::new_infinite(Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn finds_mate_in_one() {
        // White queen g7, white king b6, black king a8 (lone): Qb7# covers
        // every flight square (a7 by rank, b8 by file, b7 itself defended
        // by the king) with no blocking piece in the way.
        let placement = vec![
            (Coord::new(7, 7), PieceType::build(RawType::Queen, Player::White)),
            (Coord::new(2, 6), PieceType::build(RawType::King, Player::White)),
            (Coord::new(1, 8), PieceType::build(RawType::King, Player::Black)),
        ];
        let mut rules = GameRules::standard_chess();
        rules.turn_order = vec![Player::White, Player::Black];
        let mut board = Board::new(placement, HashSet::new(), rules);

        let mut tt = TranspositionTable::new(1);
        let control = infinite_control();
        let mut ctx = fresh_context(&mut tt, &control);
        let score = aspiration_search(&mut board, 3, 0, &mut ctx);
        assert!(score >= MATE_SCORE - 2, "expected a near-immediate mate score, got {score}");
    }

    #[test]
    fn stalemate_scores_as_draw() {
        // King in the corner with no legal move and not in check: white king
        // a1, black king c2, black queen b3 controls every flight square but
        // not a1 itself.
        let placement = vec![
            (Coord::new(1, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(3, 2), PieceType::build(RawType::King, Player::Black)),
            (Coord::new(2, 3), PieceType::build(RawType::Queen, Player::Black)),
        ];
        let mut rules = GameRules::standard_chess();
        rules.turn_order = vec![Player::White, Player::Black];
        let board = Board::new(placement, HashSet::new(), rules);
        assert!(legal_moves(&board).is_empty());
        assert!(!side_in_check(&board, Player::White));
    }

    #[test]
    fn repetition_detector_flags_a_seen_hash() {
        let mut tt = TranspositionTable::new(1);
        let control = infinite_control();
        let mut ctx = fresh_context(&mut tt, &control);
        let board = Board::starting_position();
        ctx.position_history.push(board.hash());
        ctx.position_history.push(board.hash());
        assert!(repeats_in_search_path(&ctx, &board));
    }

    #[test]
    fn lmr_reduction_is_zero_for_shallow_or_early_moves() {
        assert_eq!(lmr_reduction(2, 10), 0);
        assert_eq!(lmr_reduction(10, 2), 0);
        assert!(lmr_reduction(10, 20) > 0);
    }

    #[test]
    fn legal_moves_matches_known_opening_count() {
        let board = Board::starting_position();
        assert_eq!(legal_moves(&board).len(), 20);
    }

    #[test]
    fn quick_search_returns_a_legal_move_from_start() {
        let mut board = Board::starting_position();
        let mut tt = TranspositionTable::new(1);
        let control = infinite_control();
        let mut ctx = fresh_context(&mut tt, &control);
        let score = aspiration_search(&mut board, 2, 0, &mut ctx);
        assert!(score.abs() < MATE_THRESHOLD);
        let best = ctx.pv.root_pv();
        assert!(!best.is_empty());
        let draft = MoveDraft { start: best[0].start, end: best[0].end, promotion: best[0].promotion };
        assert!(farchess_core::generate_move(&board, draft).is_ok());
    }
}
