//! Position hashing.
//!
//! A fixed 64-square, 12-piece-kind board could precompute a
//! `[[u64; 64]; 12]` piece-square table at compile time. Coordinates here
//! are unbounded, so there is no finite table to precompute; instead each
//! key is derived on demand by running a const-evaluable `xorshift`-style
//! mixing round, keyed by the packed piece type and the coordinate
//! components — the same "deterministic mixing from a fixed seed" idiom
//! without assuming a bounded index space.

use crate::coord::Coord;
use crate::piece_type::PieceType;
use crate::player::Player;

const SEED: u64 = 0x5a4f_4252_4953_5421; // "ZOBRIST!"

/// splitmix64 — one mixing round. `const fn` so the per-call cost is just
/// a handful of multiplies per key.
#[inline]
const fn splitmix64(z: u64) -> u64 {
    let z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    let z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Zobrist key for a `(piece_type, coords)` pair.
#[inline]
pub fn piece_square_key(piece_type: PieceType, coords: Coord) -> u64 {
    let mut h = splitmix64(SEED ^ piece_type.raw_bits() as u64);
    h = splitmix64(h ^ (coords.x as u64).rotate_left(17));
    h = splitmix64(h ^ (coords.y as u64).rotate_right(13));
    h
}

/// Zobrist key XORed in when it is the given player's turn to move.
#[inline]
pub fn side_to_move_key(player: Player) -> u64 {
    splitmix64(SEED ^ 0xABCD ^ player.index() as u64)
}

/// Zobrist key for a coordinate retaining its special right (castle /
/// double-push eligibility).
#[inline]
pub fn special_right_key(coords: Coord) -> u64 {
    splitmix64(SEED ^ 0x5152 ^ (coords.x as u64) ^ (coords.y as u64).rotate_left(7))
}

/// Zobrist key for the current en-passant target square.
#[inline]
pub fn en_passant_key(square: Coord) -> u64 {
    splitmix64(SEED ^ 0x4550 ^ (square.x as u64) ^ (square.y as u64).rotate_left(11))
}
