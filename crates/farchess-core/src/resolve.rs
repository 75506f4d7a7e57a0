//! Check Resolver: filter a generated moveset down to check-legal moves.
//!
//! Rather than precomputing pins and check-block/capture squares, every
//! candidate (including each step of a sliding direction) is simulated via
//! the executor and kept only if the mover's own royal survives. This is the
//! simplest possible implementation of "legal iff making it doesn't leave
//! your own king in check", at the cost of cloning the board once per
//! candidate; the search driver's hot recursive loop never calls this twice
//! for the same position since legality is filtered once at generation time.

use crate::board::Board;
use crate::coord::Coord;
use crate::exec::{build_move, simulate_prebuilt};
use crate::movegen::{CandidateMove, GeneratedMoveset, SLIDING_EXPANSION_CAP};
use crate::moveset::{UNBOUNDED_NEG, UNBOUNDED_POS};
use crate::piece::Piece;
use crate::player::Player;
use crate::raw_type::RawType;

pub fn remove_check_invalid_moves(board: &Board, mut generated: GeneratedMoveset, piece: &Piece) -> GeneratedMoveset {
    let color = piece.piece_type.get_color();

    // Check-based legality filtering only applies to win conditions that
    // actually turn "leaves your own royal in check" into an illegal move
    // (Checkmate). Every other win condition (RoyalCapture, ThreeCheck,
    // KingOfTheHill, Stalemate, ...) lets a move stand even if it leaves a
    // royal attacked, so the generated moveset passes through unfiltered. A
    // player with no royal on the board has nothing for this filter to
    // protect either.
    if !board.rules().uses_checkmate(color) || board.royals_of(color).is_empty() {
        return generated;
    }

    generated.individual.retain(|candidate| is_legal(board, piece, candidate, color));

    let sliding = std::mem::take(&mut generated.sliding);
    for (dir, (neg, pos)) in sliding {
        let pos_cap = if pos == UNBOUNDED_POS { SLIDING_EXPANSION_CAP } else { pos };
        for step in 1..=pos_cap.max(0) {
            let candidate = CandidateMove::plain(piece.coords + dir * step);
            if is_legal(board, piece, &candidate, color) {
                generated.individual.push(candidate);
            }
        }
        let neg_cap = if neg == UNBOUNDED_NEG { SLIDING_EXPANSION_CAP } else { -neg };
        for step in 1..=neg_cap.max(0) {
            let candidate = CandidateMove::plain(piece.coords - dir * step);
            if is_legal(board, piece, &candidate, color) {
                generated.individual.push(candidate);
            }
        }
    }

    generated
}

fn is_legal(board: &Board, piece: &Piece, candidate: &CandidateMove, color: Player) -> bool {
    let mut scratch = board.clone();
    let promotion = candidate.promote_trigger.then_some(RawType::Queen);
    let mv = build_move(&scratch, piece, candidate, promotion);
    simulate_prebuilt(&mut scratch, mv, |b| !crate::check::detect_check(b, color, false).check)
}

/// Low-level helper exposed for the search driver and tests that already
/// have a concrete destination and just need a legality check, without going
/// through the full moveset-generation pipeline.
pub fn would_leave_self_in_check(board: &Board, piece: &Piece, dest: Coord) -> bool {
    let candidate = CandidateMove::plain(dest);
    !is_legal(board, piece, &candidate, piece.piece_type.get_color())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coord;
    use crate::movegen::{calculate, MovesetQuery};
    use crate::piece_type::PieceType;
    use crate::raw_type::RawType;
    use crate::rules::GameRules;

    #[test]
    fn pinned_rook_cannot_leave_the_pin_line() {
        let placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(5, 2), PieceType::build(RawType::Rook, Player::White)),
            (Coord::new(5, 8), PieceType::build(RawType::Rook, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), GameRules::standard_chess());
        let rook = *board.piece_at(Coord::new(5, 2)).unwrap();
        let generated = calculate(&board, &rook, MovesetQuery::default());
        assert!(generated.individual.iter().all(|c| c.coords.x == 5));
        assert!(!generated.individual.is_empty());
    }

    #[test]
    fn royal_capture_rules_skip_check_based_filtering() {
        use crate::rules::WinCondition;

        let rules = GameRules {
            turn_order: vec![Player::White, Player::Black],
            win_conditions: vec![
                (Player::White, vec![WinCondition::RoyalCapture]),
                (Player::Black, vec![WinCondition::RoyalCapture]),
            ],
            ..GameRules::standard_chess()
        };
        let placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(5, 2), PieceType::build(RawType::Rook, Player::White)),
            (Coord::new(5, 8), PieceType::build(RawType::Rook, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), rules);
        let rook = *board.piece_at(Coord::new(5, 2)).unwrap();
        let generated = calculate(&board, &rook, MovesetQuery::default());
        // Under Checkmate rules this rook is pinned to the file; under
        // RoyalCapture there is no such thing as an illegal "leaves the
        // king exposed" move, so the full, unfiltered moveset comes back.
        assert!(generated.individual.iter().any(|c| c.coords.x != 5));
    }

    #[test]
    fn king_in_check_must_block_or_capture_or_flee() {
        let placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(1, 5), PieceType::build(RawType::Rook, Player::White)),
            (Coord::new(5, 8), PieceType::build(RawType::Rook, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), GameRules::standard_chess());
        let rook = *board.piece_at(Coord::new(1, 5)).unwrap();
        let generated = calculate(&board, &rook, MovesetQuery::default());
        // The only move that resolves the check is interposing on the
        // attacked file; every other rank/file square stays illegal.
        assert_eq!(generated.individual.iter().map(|c| c.coords).collect::<Vec<_>>(), vec![Coord::new(5, 5)]);
    }
}
