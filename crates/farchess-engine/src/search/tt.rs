//! Transposition table: a fixed-size slot array keyed by Zobrist hash.
//!
//! A lockless-atomic table (two `AtomicU64` words per entry, XOR torn-write
//! detection) earns its keep when a pool of search threads shares one
//! table. Search here is single-threaded and cooperative — one thread ever
//! mutates the board, no shared-table concurrency — so this drops the
//! atomics entirely in favor of a plain `Vec<Option<Slot>>`, keeping the
//! same replacement policy and mate-distance score adjustment.

use farchess_core::Move;

const MATE_THRESHOLD: i32 = 28_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    LowerBound,
    UpperBound,
}

/// Adjust a mate score found `ply` plies from the root to one measured from
/// the node currently being stored, so the same mate stays comparable no
/// matter how deep in the tree it's re-probed from.
pub fn score_to_tt(score: i32, ply: u8) -> i32 {
    if score >= MATE_THRESHOLD {
        score + i32::from(ply)
    } else if score <= -MATE_THRESHOLD {
        score - i32::from(ply)
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`]: adjust a stored mate score back to one
/// measured from the root, for the node currently probing it.
pub fn score_from_tt(score: i32, ply: u8) -> i32 {
    if score >= MATE_THRESHOLD {
        score - i32::from(ply)
    } else if score <= -MATE_THRESHOLD {
        score + i32::from(ply)
    } else {
        score
    }
}

#[derive(Debug, Clone)]
struct Slot {
    key: u64,
    depth: u8,
    score: i32,
    eval: i32,
    best_move: Option<Move>,
    bound: Bound,
    age: u8,
}

/// What a successful [`TranspositionTable::probe`] hands back to the caller.
pub struct TtProbeResult {
    pub depth: u8,
    pub score: i32,
    pub eval: i32,
    pub best_move: Option<Move>,
    pub bound: Bound,
}

pub struct TranspositionTable {
    slots: Vec<Option<Slot>>,
    mask: u64,
    age: u8,
}

impl TranspositionTable {
    /// Size the slot count to the nearest power of two that fits in `mb`
    /// megabytes.
    pub fn new(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        let slot_size = std::mem::size_of::<Option<Slot>>().max(1);
        let count = (bytes / slot_size).max(1).next_power_of_two();
        TranspositionTable { slots: vec![None; count], mask: count as u64 - 1, age: 0 }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.age = 0;
    }

    /// Called once per completed search so stale entries from an earlier
    /// game (or an earlier position in this one) lose replacement priority.
    pub fn new_generation(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    fn index(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    pub fn probe(&self, hash: u64, ply: u8) -> Option<TtProbeResult> {
        let slot = self.slots[self.index(hash)].as_ref()?;
        if slot.key != hash {
            return None;
        }
        Some(TtProbeResult {
            depth: slot.depth,
            score: score_from_tt(slot.score, ply),
            eval: slot.eval,
            best_move: slot.best_move.clone(),
            bound: slot.bound,
        })
    }

    /// Replace the slot at `hash`'s index when it's empty, belongs to an
    /// older search generation, carries an equal-or-shallower depth, or the
    /// new entry is an exact bound (which is always worth keeping over a
    /// bound).
    pub fn store(&mut self, hash: u64, depth: u8, score: i32, eval: i32, best_move: Option<Move>, bound: Bound, ply: u8) {
        let idx = self.index(hash);
        let should_replace = match &self.slots[idx] {
            None => true,
            Some(existing) => {
                existing.key != hash
                    || existing.age != self.age
                    || depth >= existing.depth
                    || bound == Bound::Exact
            }
        };
        if !should_replace {
            return;
        }
        self.slots[idx] = Some(Slot {
            key: hash,
            depth,
            score: score_to_tt(score, ply),
            eval,
            best_move,
            bound,
            age: self.age,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_probe_round_trips() {
        let mut tt = TranspositionTable::new(1);
        tt.store(42, 5, 100, 90, None, Bound::Exact, 0);
        let probed = tt.probe(42, 0).unwrap();
        assert_eq!(probed.depth, 5);
        assert_eq!(probed.score, 100);
        assert_eq!(probed.bound, Bound::Exact);
    }

    #[test]
    fn index_collision_with_different_key_is_a_miss() {
        let mut tt = TranspositionTable::new(1);
        let slot_count = tt.mask + 1;
        tt.store(0, 5, 100, 90, None, Bound::Exact, 0);
        // Same bucket (hash & mask == 0), different key: must not return the
        // slot that actually belongs to hash 0.
        assert!(tt.probe(slot_count, 0).is_none());
    }

    #[test]
    fn shallower_depth_does_not_replace_deeper() {
        let mut tt = TranspositionTable::new(1);
        tt.store(7, 10, 500, 400, None, Bound::LowerBound, 0);
        tt.store(7, 2, -500, -400, None, Bound::LowerBound, 0);
        let probed = tt.probe(7, 0).unwrap();
        assert_eq!(probed.depth, 10);
    }

    #[test]
    fn exact_bound_always_replaces() {
        let mut tt = TranspositionTable::new(1);
        tt.store(7, 10, 500, 400, None, Bound::LowerBound, 0);
        tt.store(7, 2, 1, 1, None, Bound::Exact, 0);
        let probed = tt.probe(7, 0).unwrap();
        assert_eq!(probed.depth, 2);
        assert_eq!(probed.bound, Bound::Exact);
    }

    #[test]
    fn mate_score_is_ply_adjusted_on_round_trip() {
        let mut tt = TranspositionTable::new(1);
        // A mate found 3 plies into this search, stored while 2 plies deep:
        // score_to_tt measures "from this node", score_from_tt at a
        // different ply re-measures from that probing node.
        let score_at_node = 29_000 - 1;
        tt.store(99, 4, score_at_node, score_at_node, None, Bound::Exact, 2);
        let probed = tt.probe(99, 2).unwrap();
        assert_eq!(probed.score, score_at_node);
    }

    #[test]
    fn clear_empties_all_slots() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 1, 1, 1, None, Bound::Exact, 0);
        tt.clear();
        assert!(tt.probe(1, 0).is_none());
    }
}
