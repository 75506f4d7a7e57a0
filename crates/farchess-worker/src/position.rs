//! Decode the worker protocol's `lf` payload into a [`Board`].
//!
//! ICN notation (see [`farchess_core::parse_icn`]) round-trips piece
//! placement only — turn and special rights live outside it, so the wire
//! payload carries them as sibling fields rather than folding everything
//! into one opaque string. `move_rule_counter` and en-passant state have no
//! public constructor on [`Board`] (by design — see `farchess-core`'s board
//! model), so a freshly decoded position always starts with a clean move
//! clock and no en-passant square, the same as a position handed to the
//! core from a fresh variant generator.

use std::collections::HashSet;

use farchess_core::{format_icn, parse_icn, Board, Coord, GameRules, Player};

use crate::error::WorkerError;
use crate::wire::LfPayload;

fn turn_from_marker(marker: &str) -> Result<Player, WorkerError> {
    match marker {
        "w" => Ok(Player::White),
        "b" => Ok(Player::Black),
        other => Err(WorkerError::UnknownTurn { found: other.to_string() }),
    }
}

fn marker_from_turn(turn: Player) -> &'static str {
    match turn {
        Player::White => "w",
        Player::Black | Player::Neutral => "b",
    }
}

/// Build a [`Board`] from a decoded `lf` payload. Rules are fixed to
/// standard chess: the wire format carries a position and a turn, not a
/// full variant rule descriptor, since variant generation is an external
/// collaborator the worker protocol doesn't negotiate.
pub fn decode_lf(payload: &LfPayload) -> Result<Board, WorkerError> {
    let placement = parse_icn(&payload.placement)?;
    let turn = turn_from_marker(&payload.turn)?;
    let special_rights: HashSet<Coord> =
        payload.special_rights.iter().map(|s| s.parse()).collect::<Result<_, _>>()?;

    let mut rules = GameRules::standard_chess();
    rules.turn_order = match turn {
        Player::White => vec![Player::White, Player::Black],
        _ => vec![Player::Black, Player::White],
    };

    Ok(Board::new(placement, special_rights, rules))
}

/// Serialize `board`'s current position back into an `lf` payload, for
/// tests that want a round trip without hand-authoring ICN strings.
pub fn encode_lf(board: &Board) -> LfPayload {
    let placement: Vec<_> = board.all_pieces().map(|p| (p.coords, p.piece_type)).collect();
    let special_rights: Vec<String> = placement
        .iter()
        .filter(|&&(coord, _)| board.has_special_right(coord))
        .map(|&(coord, _)| coord.to_string())
        .collect();
    LfPayload { placement: format_icn(&placement), turn: marker_from_turn(board.turn()).to_string(), special_rights }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farchess_core::Board;

    #[test]
    fn starting_position_round_trips() {
        let board = Board::starting_position();
        let payload = encode_lf(&board);
        let decoded = decode_lf(&payload).unwrap();
        assert_eq!(decoded.turn(), board.turn());
        assert_eq!(decoded.all_pieces().count(), board.all_pieces().count());
    }

    #[test]
    fn black_to_move_is_decoded_correctly() {
        let payload = LfPayload {
            placement: "K 5,1 | k 5,8".to_string(),
            turn: "b".to_string(),
            special_rights: Vec::new(),
        };
        let board = decode_lf(&payload).unwrap();
        assert_eq!(board.turn(), Player::Black);
    }

    #[test]
    fn unknown_turn_marker_is_rejected() {
        let payload =
            LfPayload { placement: "K 5,1 | k 5,8".to_string(), turn: "x".to_string(), special_rights: Vec::new() };
        assert!(decode_lf(&payload).is_err());
    }

    #[test]
    fn malformed_placement_is_rejected() {
        let payload =
            LfPayload { placement: "not an icn string".to_string(), turn: "w".to_string(), special_rights: Vec::new() };
        assert!(decode_lf(&payload).is_err());
    }
}
