//! Check Detector: is a square (or a player's royals) attacked.

use crate::board::{Attacker, Board};
use crate::moveset::moveset_for;
use crate::movegen::{calculate, MovesetQuery};
use crate::player::Player;

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub check: bool,
    pub attackers: Vec<Attacker>,
}

/// `detectCheck(board, color, trackAttackers)`: true if any of `color`'s
/// royal pieces are attacked by `!color`.
pub fn detect_check(board: &Board, color: Player, track_attackers: bool) -> CheckResult {
    let mut attackers: Vec<Attacker> = Vec::new();
    for royal in board.royals_of(color) {
        for found in attackers_of(board, royal, !color, !track_attackers) {
            if !attackers.iter().any(|a| a.coords == found.coords) {
                attackers.push(found);
            } else if found.sliding_check {
                if let Some(existing) = attackers.iter_mut().find(|a| a.coords == found.coords) {
                    existing.sliding_check = true;
                }
            }
        }
    }
    CheckResult { check: !attackers.is_empty(), attackers }
}

/// `true` if `square` is attacked by a piece belonging to `by`. Used both by
/// [`detect_check`] and directly by castling's "not through check" test.
pub fn is_square_attacked(board: &Board, square: crate::coord::Coord, by: Player) -> bool {
    !attackers_of(board, square, by, true).is_empty()
}

fn attackers_of(board: &Board, square: crate::coord::Coord, by: Player, stop_at_first: bool) -> Vec<Attacker> {
    let mut found = Vec::new();

    for (&offset, raws) in &board.vicinity().vicinity {
        let Some(candidate) = square.checked_sub(offset) else { continue };
        if let Some(p) = board.piece_at(candidate) {
            if p.piece_type.get_color() == by && raws.contains(&p.piece_type.get_raw()) {
                found.push(Attacker { coords: candidate, sliding_check: false, path: None });
                if stop_at_first {
                    return found;
                }
            }
        }
    }

    for (&offset, raws) in &board.vicinity().special_vicinity {
        let Some(candidate) = square.checked_sub(offset) else { continue };
        if let Some(p) = board.piece_at(candidate) {
            if p.piece_type.get_color() == by && raws.contains(&p.piece_type.get_raw()) {
                let generated = calculate(board, p, MovesetQuery { only_specials: true, ignore_check: true });
                if let Some(c) = generated.individual.iter().find(|c| c.coords == square) {
                    found.push(Attacker { coords: candidate, sliding_check: false, path: c.path.clone() });
                    if stop_at_first {
                        return found;
                    }
                }
            }
        }
    }

    for &dir in board.active_directions() {
        let Some(line) = board.line_through(dir, square) else { continue };
        let key = Board::dot_along(square, dir);

        if let Some((_, &coord)) = line.range((key + 1)..).next() {
            if let Some(p) = board.piece_at(coord) {
                if p.piece_type.get_color() == by && moveset_for(p.piece_type).sliding.contains(&dir) {
                    found.push(Attacker { coords: coord, sliding_check: true, path: None });
                    if stop_at_first {
                        return found;
                    }
                }
            }
        }
        if let Some((_, &coord)) = line.range(..key).next_back() {
            if let Some(p) = board.piece_at(coord) {
                if p.piece_type.get_color() == by && moveset_for(p.piece_type).sliding.contains(&dir) {
                    found.push(Attacker { coords: coord, sliding_check: true, path: None });
                    if stop_at_first {
                        return found;
                    }
                }
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::coord::Coord;

    #[test]
    fn starting_position_has_no_check() {
        let board = Board::starting_position();
        assert!(!detect_check(&board, Player::White, true).check);
        assert!(!detect_check(&board, Player::Black, true).check);
    }

    #[test]
    fn rook_on_open_file_checks_king() {
        use crate::piece_type::PieceType;
        use crate::raw_type::RawType;
        use crate::rules::GameRules;
        let placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(5, 8), PieceType::build(RawType::Rook, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), GameRules::standard_chess());
        let result = detect_check(&board, Player::White, true);
        assert!(result.check);
        assert_eq!(result.attackers[0].coords, Coord::new(5, 8));
        assert!(result.attackers[0].sliding_check);
    }

    #[test]
    fn knight_vicinity_check() {
        use crate::piece_type::PieceType;
        use crate::raw_type::RawType;
        use crate::rules::GameRules;
        let placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(6, 3), PieceType::build(RawType::Knight, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), GameRules::standard_chess());
        assert!(detect_check(&board, Player::White, true).check);
    }
}
