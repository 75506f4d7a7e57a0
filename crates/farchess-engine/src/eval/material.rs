//! Material balance evaluation.
//!
//! Counts [`RawType::material_value`] for every piece on the board and
//! returns the White-minus-Black balance, walking [`Board::all_pieces`]
//! rather than a fixed 64-square population count, since there is no fixed
//! board size to count bits over.

use farchess_core::{Board, Player, RawType};

fn signed_value(raw: RawType, player: Player) -> i32 {
    match player {
        Player::White => raw.material_value(),
        Player::Black => -raw.material_value(),
        Player::Neutral => 0,
    }
}

/// White-minus-Black material balance. Positive favors White, negative
/// favors Black. Neutral pieces never contribute — they belong to no side.
pub fn material_balance(board: &Board) -> i32 {
    board.all_pieces().map(|piece| {
        let (raw, player) = piece.piece_type.split();
        signed_value(raw, player)
    }).sum()
}

/// [`material_balance`] from the perspective of the side to move: positive
/// means the side to move is ahead. This is the convention a negamax search
/// wants directly at its stand-pat/leaf evaluation.
pub fn material_score(board: &Board) -> i32 {
    let balance = material_balance(board);
    match board.turn() {
        Player::White => balance,
        Player::Black => -balance,
        Player::Neutral => balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farchess_core::{Board, Coord, GameRules, PieceType};
    use std::collections::HashSet;

    #[test]
    fn starting_position_is_balanced() {
        let board = Board::starting_position();
        assert_eq!(material_balance(&board), 0);
        assert_eq!(material_score(&board), 0);
    }

    fn bare_kings_plus(extra: Vec<(Coord, PieceType)>, turn: Player) -> Board {
        let mut placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(5, 8), PieceType::build(RawType::King, Player::Black)),
        ];
        placement.extend(extra);
        let mut rules = GameRules::standard_chess();
        rules.turn_order = vec![turn];
        Board::new(placement, HashSet::new(), rules)
    }

    #[test]
    fn missing_black_queen_favors_white() {
        let board = bare_kings_plus(
            vec![(Coord::new(4, 1), PieceType::build(RawType::Queen, Player::White))],
            Player::White,
        );
        assert_eq!(material_balance(&board), RawType::Queen.material_value());
        assert_eq!(material_score(&board), RawType::Queen.material_value());
    }

    #[test]
    fn score_flips_sign_for_black_to_move() {
        let board = bare_kings_plus(
            vec![(Coord::new(4, 1), PieceType::build(RawType::Queen, Player::White))],
            Player::Black,
        );
        assert_eq!(material_score(&board), -RawType::Queen.material_value());
    }

    #[test]
    fn neutral_pieces_never_contribute() {
        let board = bare_kings_plus(
            vec![(Coord::new(0, 0), PieceType::build(RawType::Rose, Player::Neutral))],
            Player::White,
        );
        assert_eq!(material_balance(&board), 0);
    }
}
