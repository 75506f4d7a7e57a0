//! Killer, history, counter-move, and continuation-history tables for
//! quiet-move ordering. `HashMap` lookups keyed by [`Coord`] stand in for a
//! fixed 0-63-square array, since there is no fixed square count to size
//! an array over.

use std::collections::HashMap;

use farchess_core::{Coord, Move, RawType};

use crate::search::negamax::MAX_PLY;
use crate::search::ordering::{move_key, MoveKey};

const HISTORY_MAX: i32 = 16_384;

fn gravity_update(entry: &mut i32, magnitude: i32) {
    *entry += magnitude - (*entry * magnitude.abs()) / HISTORY_MAX;
    *entry = (*entry).clamp(-HISTORY_MAX, HISTORY_MAX);
}

/// Two quiet killer moves per ply: moves that caused a beta cutoff without
/// capturing anything, tried early at sibling nodes of the same ply.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: Vec<[Option<MoveKey>; 2]>,
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    pub fn new() -> Self {
        KillerTable { slots: vec![[None, None]; MAX_PLY] }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = [None, None]);
    }

    /// Shift slot 0 into slot 1 and store `mv` as the new slot 0, unless
    /// it's already the top killer.
    pub fn store(&mut self, ply: usize, mv: &Move) {
        let Some(bucket) = self.slots.get_mut(ply) else { return };
        let key = move_key(mv);
        if bucket[0] == Some(key) {
            return;
        }
        bucket[1] = bucket[0];
        bucket[0] = Some(key);
    }

    pub fn is_killer(&self, ply: usize, mv: &Move) -> bool {
        let Some(bucket) = self.slots.get(ply) else { return false };
        let key = move_key(mv);
        bucket[0] == Some(key) || bucket[1] == Some(key)
    }
}

/// Butterfly history: how often a (piece, destination) quiet move has
/// caused a cutoff, weighted by the depth it happened at. Scores saturate
/// at [`HISTORY_MAX`] via a gravity update so one early blowout can't
/// permanently dominate ordering.
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    table: HashMap<(RawType, Coord), i32>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn update_good(&mut self, piece: RawType, to: Coord, depth: u8) {
        let bonus = i32::from(depth) * i32::from(depth);
        gravity_update(self.table.entry((piece, to)).or_insert(0), bonus);
    }

    pub fn update_bad(&mut self, piece: RawType, to: Coord, depth: u8) {
        let penalty = i32::from(depth) * i32::from(depth);
        gravity_update(self.table.entry((piece, to)).or_insert(0), -penalty);
    }

    pub fn score(&self, piece: RawType, to: Coord) -> i32 {
        self.table.get(&(piece, to)).copied().unwrap_or(0)
    }

    /// Decay every entry by 10% between iterative-deepening depths so stale
    /// history from shallow iterations fades rather than entrenching.
    pub fn decay(&mut self) {
        for value in self.table.values_mut() {
            *value = (*value * 9) / 10;
        }
    }
}

/// One best reply per (previous piece, previous destination) pair — tried
/// right after killers since it predicts the opponent's likely follow-up
/// better than plain history does.
#[derive(Debug, Clone, Default)]
pub struct CounterMoveTable {
    table: HashMap<(RawType, Coord), MoveKey>,
}

impl CounterMoveTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn store(&mut self, prev_piece: RawType, prev_to: Coord, mv: &Move) {
        self.table.insert((prev_piece, prev_to), move_key(mv));
    }

    pub fn is_counter(&self, prev_piece: RawType, prev_to: Coord, mv: &Move) -> bool {
        self.table.get(&(prev_piece, prev_to)) == Some(&move_key(mv))
    }
}

/// History indexed by the (piece, destination) pair two plies apart: does
/// this quiet move tend to work well right after that one did. Catches
/// follow-up patterns (a rook lift after a pawn push, say) that plain
/// butterfly history can't see since it only looks at the move itself.
#[derive(Debug, Clone, Default)]
pub struct ContinuationHistory {
    table: HashMap<(RawType, Coord, RawType, Coord), i32>,
}

impl ContinuationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    fn key(prev_piece: RawType, prev_to: Coord, piece: RawType, to: Coord) -> (RawType, Coord, RawType, Coord) {
        (prev_piece, prev_to, piece, to)
    }

    pub fn update_good(&mut self, prev_piece: RawType, prev_to: Coord, piece: RawType, to: Coord, depth: u8) {
        let bonus = i32::from(depth) * i32::from(depth);
        gravity_update(self.table.entry(Self::key(prev_piece, prev_to, piece, to)).or_insert(0), bonus);
    }

    pub fn update_bad(&mut self, prev_piece: RawType, prev_to: Coord, piece: RawType, to: Coord, depth: u8) {
        let penalty = i32::from(depth) * i32::from(depth);
        gravity_update(self.table.entry(Self::key(prev_piece, prev_to, piece, to)).or_insert(0), -penalty);
    }

    pub fn score(&self, prev_piece: RawType, prev_to: Coord, piece: RawType, to: Coord) -> i32 {
        self.table.get(&Self::key(prev_piece, prev_to, piece, to)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farchess_core::{generate_move, Board, MoveDraft};

    fn draft_move(board: &Board, start: (i64, i64), end: (i64, i64)) -> Move {
        generate_move(board, MoveDraft { start: Coord::new(start.0, start.1), end: Coord::new(end.0, end.1), promotion: None }).unwrap()
    }

    #[test]
    fn killer_store_then_recognized() {
        let board = Board::starting_position();
        let mv = draft_move(&board, (5, 2), (5, 4));
        let mut killers = KillerTable::new();
        assert!(!killers.is_killer(3, &mv));
        killers.store(3, &mv);
        assert!(killers.is_killer(3, &mv));
    }

    #[test]
    fn killer_shifts_older_into_second_slot() {
        let board = Board::starting_position();
        let first = draft_move(&board, (5, 2), (5, 4));
        let second = draft_move(&board, (2, 2), (2, 3));
        let mut killers = KillerTable::new();
        killers.store(1, &first);
        killers.store(1, &second);
        assert!(killers.is_killer(1, &first));
        assert!(killers.is_killer(1, &second));
    }

    #[test]
    fn killer_store_is_idempotent_for_repeat_move() {
        let board = Board::starting_position();
        let mv = draft_move(&board, (5, 2), (5, 4));
        let other = draft_move(&board, (2, 2), (2, 3));
        let mut killers = KillerTable::new();
        killers.store(0, &mv);
        killers.store(0, &mv);
        assert!(killers.is_killer(0, &mv));
        assert!(!killers.is_killer(0, &other));
    }

    #[test]
    fn history_rewards_and_decays() {
        let mut history = HistoryTable::new();
        history.update_good(RawType::Knight, Coord::new(3, 3), 4);
        let boosted = history.score(RawType::Knight, Coord::new(3, 3));
        assert!(boosted > 0);
        history.decay();
        assert!(history.score(RawType::Knight, Coord::new(3, 3)) < boosted);
    }

    #[test]
    fn history_saturates_at_max() {
        let mut history = HistoryTable::new();
        for _ in 0..1000 {
            history.update_good(RawType::Queen, Coord::new(5, 5), 20);
        }
        assert!(history.score(RawType::Queen, Coord::new(5, 5)) <= HISTORY_MAX);
    }

    #[test]
    fn counter_move_round_trips() {
        let board = Board::starting_position();
        let reply = draft_move(&board, (5, 2), (5, 4));
        let mut counters = CounterMoveTable::new();
        counters.store(RawType::Knight, Coord::new(6, 3), &reply);
        assert!(counters.is_counter(RawType::Knight, Coord::new(6, 3), &reply));
        assert!(!counters.is_counter(RawType::Knight, Coord::new(6, 4), &reply));
    }

    #[test]
    fn continuation_history_independent_per_pair() {
        let mut cont = ContinuationHistory::new();
        cont.update_good(RawType::Pawn, Coord::new(4, 4), RawType::Knight, Coord::new(3, 5), 3);
        assert!(cont.score(RawType::Pawn, Coord::new(4, 4), RawType::Knight, Coord::new(3, 5)) > 0);
        assert_eq!(cont.score(RawType::Pawn, Coord::new(4, 4), RawType::Knight, Coord::new(3, 6)), 0);
    }
}
