//! Core chess types: board representation, move generation, and game rules,
//! generalized to an unbounded integer coordinate board.

mod board;
mod check;
mod chess_move;
mod coord;
mod error;
mod exec;
mod movegen;
mod moveset;
mod notation;
mod perft;
mod piece;
mod piece_type;
mod player;
mod raw_type;
mod resolve;
mod rules;
mod zobrist;

pub use board::{Attacker, Board, EnPassantState};
pub use check::{detect_check, is_square_attacked, CheckResult};
pub use chess_move::{CastleInfo, Change, Move, MoveKind, StateUpdate};
pub use coord::Coord;
pub use error::{CoreError, MoveError, NotationError};
pub use exec::{
    build_move, generate_move, make_move, make_null_move, rewind_move, rewind_null_move, simulate_move_wrapper,
    simulate_prebuilt, MoveDraft, NullMoveUndo,
};
pub use movegen::{calculate, CandidateMove, GeneratedMoveset, MovesetQuery, SLIDING_EXPANSION_CAP};
pub use moveset::{
    moveset_for, standard_blocking, standard_ignore, BlockResult, BlockingFn, IgnoreFn, MovesetDescriptor,
    SpecialKind, VicinityTables, UNBOUNDED_NEG, UNBOUNDED_POS,
};
pub use notation::{format_icn, format_move, parse_icn, parse_move_draft};
pub use perft::perft;
pub use piece::Piece;
pub use piece_type::PieceType;
pub use player::Player;
pub use raw_type::RawType;
pub use resolve::{remove_check_invalid_moves, would_leave_self_in_check};
pub use rules::{GameRules, WinCondition};
