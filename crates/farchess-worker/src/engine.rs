//! Line-delimited JSON worker loop: read a position, search it, reply with
//! a move. No `stop`/`ponderhit`/background search thread — the wire
//! protocol only ever asks for one position at a time and never interrupts
//! an in-flight search — the per-move time budget in [`WorkerConfig`] is
//! the only thing that ever stops a search early.

use std::io::{BufRead, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, info, warn};

use farchess_core::Board;
use farchess_engine::time::control_for_move_time;
use farchess_engine::Searcher;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::position::decode_lf;
use crate::wire::{InMessage, MoveDraftWire};

/// Owns the search state a worker process keeps across messages: the
/// transposition table persists across positions within one process
/// (heuristic tables are cleared per search, but a warm TT carries value
/// across a sequence of searches the same process runs).
pub struct Worker {
    searcher: Searcher,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Worker {
        let mut searcher = Searcher::new();
        searcher.resize_tt(config.tt_mb);
        Worker { searcher, config }
    }

    /// Run the worker loop: emit the startup `"readyok"`, then read one
    /// `{ lf: ... }` message per line from `input`, writing a `MoveDraft`
    /// reply to `output` for each. Recoverable errors are logged and the
    /// offending line is skipped; the loop itself never returns early on
    /// them.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), WorkerError> {
        writeln!(output, "{}", serde_json::to_string("readyok")?)?;
        output.flush()?;
        info!("worker ready");

        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = input.read_line(&mut line)?;
            if bytes_read == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match self.handle_line(trimmed) {
                Ok(wire) => {
                    writeln!(output, "{}", serde_json::to_string(&wire)?)?;
                    output.flush()?;
                }
                Err(err) => warn!(error = %err, line = %trimmed, "dropping malformed or unplayable worker message"),
            }
        }

        info!("worker shutting down");
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<MoveDraftWire, WorkerError> {
        let message: InMessage = serde_json::from_str(line)?;
        let mut board = decode_lf(&message.lf)?;
        debug!(turn = ?board.turn(), "searching position");

        let stopped = Arc::new(AtomicBool::new(false));
        let control = control_for_move_time(self.config.move_time, stopped);

        let result = self.searcher.search(&mut board, 64, &control, |depth, score, nodes, _pv| {
            debug!(depth, score, nodes, "completed iteration");
        });

        let best_move = result.best_move.ok_or(WorkerError::NoLegalMove)?;
        let draft = farchess_core::MoveDraft { start: best_move.start, end: best_move.end, promotion: best_move.promotion };
        Ok(draft.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::encode_lf;

    fn worker() -> Worker {
        Worker::new(WorkerConfig { tt_mb: 1, move_time: std::time::Duration::from_millis(200) })
    }

    #[test]
    fn run_emits_readyok_then_a_move_for_startpos() {
        let mut worker = worker();
        let payload = encode_lf(&Board::starting_position());
        let message = serde_json::json!({ "lf": payload }).to_string();
        let input = format!("{message}\n");
        let mut output = Vec::new();

        worker.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "\"readyok\"");
        let reply: MoveDraftWire = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert!(reply.to_draft().is_some());
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let mut worker = worker();
        let good = encode_lf(&Board::starting_position());
        let good_message = serde_json::json!({ "lf": good }).to_string();
        let input = format!("not json at all\n{good_message}\n");
        let mut output = Vec::new();

        worker.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        // readyok plus exactly one move reply — the bad line produced no reply.
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn empty_input_only_emits_readyok() {
        let mut worker = worker();
        let mut output = Vec::new();
        worker.run(&b""[..], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["\"readyok\""]);
    }
}
