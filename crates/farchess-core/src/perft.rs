//! Exhaustive move-count test harness, generalized from a fixed-board perft
//! to walk every legal move of every active piece regardless of board size.

use crate::board::Board;
use crate::exec::{build_move, make_move, rewind_move};
use crate::movegen::{calculate, MovesetQuery};
use crate::piece::Piece;
use crate::raw_type::RawType;

/// Count leaf nodes reachable in exactly `depth` plies from `board`'s
/// current position, mutating `board` via make/unmake rather than cloning.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let color = board.turn();
    let pieces: Vec<Piece> = board.pieces_of(color).copied().collect();
    let mut nodes = 0u64;

    for piece in pieces {
        let generated = calculate(board, &piece, MovesetQuery::default());
        for candidate in generated.all_candidates() {
            let promotions: Vec<Option<RawType>> = if candidate.promote_trigger {
                board.rules().promotions_allowed_for(color).iter().map(|&rt| Some(rt)).collect()
            } else {
                vec![None]
            };
            for promotion in promotions {
                let mv = build_move(board, &piece, &candidate, promotion);
                make_move(board, mv).expect("internally generated move is always synced");
                nodes += perft(board, depth - 1);
                rewind_move(board).expect("rewind of the move just made cannot fail");
            }
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_is_one_leaf() {
        let mut board = Board::starting_position();
        assert_eq!(perft(&mut board, 0), 1);
    }

    #[test]
    fn starting_position_depth_one_has_twenty_moves() {
        let mut board = Board::starting_position();
        assert_eq!(perft(&mut board, 1), 20);
    }

    #[test]
    fn starting_position_depth_two_matches_known_value() {
        let mut board = Board::starting_position();
        assert_eq!(perft(&mut board, 2), 400);
    }
}
