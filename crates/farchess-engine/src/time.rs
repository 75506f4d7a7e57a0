//! Time management — turn a flat per-move budget into search limits.
//!
//! The worker protocol hands the engine a single `FARCHESS_MOVE_TIME_MS`
//! budget per move rather than a clock/increment/moves-to-go negotiation, so
//! there is no formula to derive a budget from: the caller already decided
//! how long this move gets.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::search::control::SearchControl;

/// Soft limit as a fraction of the hard budget: iterative deepening stops
/// starting new depths once this fraction of `move_time` has elapsed, while
/// still allowing an in-flight iteration to run up to the hard limit.
const SOFT_FRACTION: f64 = 0.6;

/// Build a [`SearchControl`] for a fixed `move_time` budget.
pub fn control_for_move_time(move_time: Duration, stopped: Arc<AtomicBool>) -> SearchControl {
    let soft_ms = (move_time.as_millis() as f64 * SOFT_FRACTION) as u64;
    let soft = Duration::from_millis(soft_ms.max(1));
    SearchControl::new_timed(stopped, soft, move_time)
}

/// Build a [`SearchControl`] with no time limit, bounded only by the stop
/// flag — used when the worker is asked to search to a fixed depth instead
/// of a time budget.
pub fn control_for_infinite(stopped: Arc<AtomicBool>) -> SearchControl {
    SearchControl::new_infinite(stopped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_time_control_does_not_stop_immediately() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = control_for_move_time(Duration::from_secs(5), stopped);
        assert!(!control.should_stop_iterating());
        assert!(!control.should_stop(2048));
    }

    #[test]
    fn infinite_control_never_stops_iterating_on_its_own() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = control_for_infinite(stopped);
        assert!(!control.should_stop_iterating());
    }

    #[test]
    fn stop_flag_halts_both_kinds_of_control() {
        let stopped = Arc::new(AtomicBool::new(true));
        let timed = control_for_move_time(Duration::from_secs(5), Arc::clone(&stopped));
        let infinite = control_for_infinite(stopped);
        assert!(timed.should_stop_iterating());
        assert!(infinite.should_stop_iterating());
    }
}
