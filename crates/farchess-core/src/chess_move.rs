//! The applied-move record: what changed on the board and how to undo it.

use crate::board::{Attacker, EnPassantState};
use crate::coord::Coord;
use crate::piece::Piece;
use crate::piece_type::PieceType;
use crate::player::Player;
use crate::raw_type::RawType;

/// What kind of move this is, independent of the piece that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    Capture,
    Castle,
    EnPassant,
    Promotion,
}

/// Castling detail: which direction the king moved and the rook it castled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleInfo {
    /// `+1` or `-1` along the castling rank.
    pub dir: i64,
    pub rook_from: Coord,
    pub rook_to: Coord,
}

/// A single reversible board mutation. Applied in list order going forward,
/// reverse order going backward, so a move's effects undo cleanly regardless
/// of how many individual changes it bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    MovePiece { from: Coord, to: Coord },
    Capture { at: Coord, captured: Piece },
    Delete { at: Coord, piece: Piece },
    Add { at: Coord, piece: Piece },
}

/// A single reversible update to the board's aggregate (non-per-square)
/// state. Stored alongside `changes[]` so `rewindMove` can restore
/// byte-identical state without recomputing anything from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    EnPassant { prev: Option<EnPassantState> },
    SpecialRight { coord: Coord, had_right: bool },
    MoveRule { prev: u32 },
    Check { prev_in_check: bool, prev_attackers: Vec<Attacker> },
    TurnCursor { prev: Player },
}

/// An applied (or about-to-be-applied) move, carrying everything needed to
/// both describe and undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub start: Coord,
    pub end: Coord,
    pub piece_type: PieceType,
    pub kind: MoveKind,
    pub promotion: Option<RawType>,
    pub castle: Option<CastleInfo>,
    pub enpassant: bool,
    pub enpassant_create: Option<EnPassantState>,
    /// Full waypoint traversal for path-pieces (e.g. Rose); `None` for
    /// ordinary movers whose path is just `start -> end`.
    pub path: Option<Vec<Coord>>,
    pub changes: Vec<Change>,
    pub state_updates: Vec<StateUpdate>,
    /// `board.move_index + 1` at generation time; guards against applying
    /// against a desynced board (see [`crate::error::CoreError::DesyncedApply`]).
    pub generate_index: u64,
    pub gives_check: bool,
    pub is_mate: bool,
    pub is_capture: bool,
}

impl Move {
    pub fn is_castle(&self) -> bool {
        self.castle.is_some()
    }
}
