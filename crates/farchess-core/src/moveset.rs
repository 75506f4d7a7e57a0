//! Per-piece-type moveset descriptors and the vicinity tables built from them.

use std::collections::HashMap;

use crate::coord::Coord;
use crate::piece_type::PieceType;
use crate::player::Player;
use crate::raw_type::RawType;

/// A signed step-count bound along a sliding direction. `i64::MAX`/`MIN`
/// stand in for "unbounded" — arithmetic saturates to these sentinels
/// rather than overflowing.
pub const UNBOUNDED_POS: i64 = i64::MAX;
pub const UNBOUNDED_NEG: i64 = i64::MIN;

/// Result of testing whether a piece on an organized line blocks a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockResult {
    /// The line continues past this piece (used only by ignore-filtered squares).
    Transparent,
    /// The slider may not land on or past this square (friendly piece).
    BlockedBefore,
    /// The slider may land on this square (capture) but not past it (enemy piece).
    BlockedAfter,
}

pub type BlockingFn = fn(mover: Player, blocker: PieceType) -> BlockResult;
pub type IgnoreFn = fn(mover: PieceType, target_coords: Coord) -> bool;

/// Which concrete special-move executor a descriptor dispatches to. Concrete
/// behavior lives in `movegen.rs`/`exec.rs`; this tag only records which one
/// applies, resolved once per variant at board-init time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    Pawn,
    King,
    Rose,
}

/// An immutable per-raw-type movement descriptor.
#[derive(Debug, Clone)]
pub struct MovesetDescriptor {
    /// Finite jump offsets (knight-like).
    pub individual: Vec<Coord>,
    /// Primitive sliding directions (rook/bishop/queen-like); a direction's
    /// *distance* limit is a property of the game, not the descriptor — the
    /// default is unbounded in both directions, see [`MovesetDescriptor::sliding_limits`].
    pub sliding: Vec<Coord>,
    pub blocking: BlockingFn,
    pub ignore: IgnoreFn,
    pub special: Option<SpecialKind>,
}

impl MovesetDescriptor {
    pub const EMPTY: MovesetDescriptor = MovesetDescriptor {
        individual: Vec::new(),
        sliding: Vec::new(),
        blocking: standard_blocking,
        ignore: standard_ignore,
        special: None,
    };

    /// Default `[neg_limit, pos_limit]` for every sliding direction this
    /// descriptor declares: unbounded both ways. Variant generators that
    /// want a shorter-range slider supply their own limit table to the board;
    /// the descriptor itself only records *which* directions exist.
    pub fn sliding_limits(&self) -> HashMap<Coord, (i64, i64)> {
        self.sliding
            .iter()
            .map(|&d| (d, (UNBOUNDED_NEG, UNBOUNDED_POS)))
            .collect()
    }
}

/// Friendly pieces block one square before themselves (you cannot land on or
/// jump past your own piece); enemy pieces block one square after themselves
/// (you may capture onto their square but not beyond it). A `Void` occupant
/// blocks before itself regardless of color — it is an impassable marker,
/// never a capturable piece.
pub fn standard_blocking(mover: Player, blocker: PieceType) -> BlockResult {
    if blocker.get_raw() == RawType::Void || blocker.get_color() == mover {
        BlockResult::BlockedBefore
    } else {
        BlockResult::BlockedAfter
    }
}

/// No squares are skipped by default; only special movers (e.g. a
/// variant-specific "ghost" piece) would ever need a non-trivial ignore rule.
pub fn standard_ignore(_mover: PieceType, _target_coords: Coord) -> bool {
    false
}

const KNIGHT_OFFSETS: [Coord; 8] = [
    Coord::new(1, 2), Coord::new(2, 1), Coord::new(2, -1), Coord::new(1, -2),
    Coord::new(-1, -2), Coord::new(-2, -1), Coord::new(-2, 1), Coord::new(-1, 2),
];

const KING_OFFSETS: [Coord; 8] = [
    Coord::new(1, 0), Coord::new(1, 1), Coord::new(0, 1), Coord::new(-1, 1),
    Coord::new(-1, 0), Coord::new(-1, -1), Coord::new(0, -1), Coord::new(1, -1),
];

const ORTHOGONAL: [Coord; 2] = [Coord::new(1, 0), Coord::new(0, 1)];
const DIAGONAL: [Coord; 2] = [Coord::new(1, 1), Coord::new(1, -1)];

/// `getPieceMoveset(type) -> descriptor`. Neutral pieces (and `Void`) yield
/// the empty descriptor regardless of raw type.
pub fn moveset_for(piece_type: PieceType) -> MovesetDescriptor {
    let (raw, player) = piece_type.split();
    if player.is_neutral() || raw == RawType::Void {
        return MovesetDescriptor::EMPTY;
    }
    match raw {
        RawType::Pawn => MovesetDescriptor {
            individual: Vec::new(),
            sliding: Vec::new(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: Some(SpecialKind::Pawn),
        },
        RawType::Knight => MovesetDescriptor {
            individual: KNIGHT_OFFSETS.to_vec(),
            sliding: Vec::new(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: None,
        },
        RawType::Bishop => MovesetDescriptor {
            individual: Vec::new(),
            sliding: DIAGONAL.to_vec(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: None,
        },
        RawType::Rook => MovesetDescriptor {
            individual: Vec::new(),
            sliding: ORTHOGONAL.to_vec(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: None,
        },
        RawType::Queen => MovesetDescriptor {
            individual: Vec::new(),
            sliding: ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: None,
        },
        RawType::King => MovesetDescriptor {
            individual: KING_OFFSETS.to_vec(),
            sliding: Vec::new(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: Some(SpecialKind::King),
        },
        RawType::Rose => MovesetDescriptor {
            individual: Vec::new(),
            sliding: Vec::new(),
            blocking: standard_blocking,
            ignore: standard_ignore,
            special: Some(SpecialKind::Rose),
        },
        RawType::Void => MovesetDescriptor::EMPTY,
    }
}

/// Vicinity tables: which raw types can attack a square from a given
/// offset with a single jump move, built from only the raw types actually
/// present in this game.
#[derive(Debug, Clone, Default)]
pub struct VicinityTables {
    /// offset -> raw types whose `individual` moveset contains it.
    pub vicinity: HashMap<Coord, Vec<RawType>>,
    /// offset -> raw types whose *special* mover could plausibly attack from
    /// it (verification of reachability is still required at use site).
    pub special_vicinity: HashMap<Coord, Vec<RawType>>,
}

impl VicinityTables {
    pub fn build(active_types: &[RawType]) -> VicinityTables {
        let mut vicinity: HashMap<Coord, Vec<RawType>> = HashMap::new();
        let mut special_vicinity: HashMap<Coord, Vec<RawType>> = HashMap::new();

        for &raw in active_types {
            let descriptor = moveset_for(PieceType::build(raw, Player::White));
            for &offset in &descriptor.individual {
                vicinity.entry(offset).or_default().push(raw);
            }
            match descriptor.special {
                Some(SpecialKind::Pawn) => {
                    // Diagonal captures only; forward pushes never capture so
                    // they are not "vicinity" in the attack sense.
                    for &offset in &[Coord::new(1, 1), Coord::new(-1, 1)] {
                        special_vicinity.entry(offset).or_default().push(raw);
                        special_vicinity.entry(-offset).or_default().push(raw);
                    }
                }
                Some(SpecialKind::Rose) => {
                    for &offset in &KNIGHT_OFFSETS {
                        special_vicinity.entry(offset).or_default().push(raw);
                    }
                }
                _ => {}
            }
        }

        VicinityTables { vicinity, special_vicinity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_pieces_are_empty() {
        let pt = PieceType::build(RawType::Queen, Player::Neutral);
        let descriptor = moveset_for(pt);
        assert!(descriptor.individual.is_empty());
        assert!(descriptor.sliding.is_empty());
    }

    #[test]
    fn queen_slides_all_eight_directions_reduced_to_four_primitives() {
        let descriptor = moveset_for(PieceType::build(RawType::Queen, Player::White));
        assert_eq!(descriptor.sliding.len(), 4);
    }

    #[test]
    fn knight_has_eight_jumps() {
        let descriptor = moveset_for(PieceType::build(RawType::Knight, Player::White));
        assert_eq!(descriptor.individual.len(), 8);
    }

    #[test]
    fn vicinity_built_from_active_types_only() {
        let tables = VicinityTables::build(&[RawType::Knight]);
        assert_eq!(tables.vicinity.len(), 8);
        assert!(tables.vicinity.values().all(|v| v == &vec![RawType::Knight]));
    }

    #[test]
    fn standard_blocking_friendly_vs_enemy() {
        let friendly = PieceType::build(RawType::Pawn, Player::White);
        let enemy = PieceType::build(RawType::Pawn, Player::Black);
        assert_eq!(standard_blocking(Player::White, friendly), BlockResult::BlockedBefore);
        assert_eq!(standard_blocking(Player::White, enemy), BlockResult::BlockedAfter);
    }

    #[test]
    fn standard_blocking_void_blocks_before_regardless_of_color() {
        let void_white = PieceType::build(RawType::Void, Player::White);
        let void_black = PieceType::build(RawType::Void, Player::Black);
        assert_eq!(standard_blocking(Player::White, void_white), BlockResult::BlockedBefore);
        assert_eq!(standard_blocking(Player::White, void_black), BlockResult::BlockedBefore);
        assert_eq!(standard_blocking(Player::Black, void_white), BlockResult::BlockedBefore);
    }
}
