//! Move Generator: per-piece candidate destinations.
//!
//! `calculate` mirrors the source API's `calculate(board, piece, opts)`: it
//! returns finite jump destinations directly and sliding destinations as
//! `[negLimit, posLimit]` step bounds along each primitive direction, which
//! callers expand only as far as they actually need.

use std::collections::HashMap;

use crate::board::{Board, EnPassantState};
use crate::chess_move::CastleInfo;
use crate::coord::Coord;
use crate::moveset::{moveset_for, BlockResult, SpecialKind, UNBOUNDED_NEG, UNBOUNDED_POS};
use crate::piece::Piece;
use crate::player::Player;
use crate::raw_type::RawType;

/// Practical horizon for materializing an "unbounded" sliding direction into
/// concrete destination squares. A slider's true range is only ever bounded
/// by a blocking piece or this cap — on a sparsely-populated board a queen
/// really can see further than any realistic game reaches, so this is a
/// documented implementation limit, not a rules limit.
pub const SLIDING_EXPANSION_CAP: i64 = 64;

/// A single candidate destination, with whatever special flags apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMove {
    pub coords: Coord,
    pub enpassant: bool,
    pub enpassant_create: Option<EnPassantState>,
    pub promote_trigger: bool,
    pub castle: Option<CastleInfo>,
    /// Full waypoint traversal, populated only for path-pieces (Rose).
    pub path: Option<Vec<Coord>>,
}

impl CandidateMove {
    pub(crate) fn plain(coords: Coord) -> CandidateMove {
        CandidateMove {
            coords,
            enpassant: false,
            enpassant_create: None,
            promote_trigger: false,
            castle: None,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MovesetQuery {
    /// Only compute the piece's special moves (used by the check detector's
    /// special-mover reachability test; never recurses into check resolution).
    pub only_specials: bool,
    /// Skip check-legality filtering entirely (used internally while
    /// detecting check/attackers, where filtering would recurse).
    pub ignore_check: bool,
}

/// The full generated moveset for one piece: finite destinations plus
/// per-direction sliding bounds, not yet expanded into concrete squares.
#[derive(Debug, Clone)]
pub struct GeneratedMoveset {
    pub origin: Coord,
    pub individual: Vec<CandidateMove>,
    pub sliding: HashMap<Coord, (i64, i64)>,
}

impl GeneratedMoveset {
    /// Expand `sliding` into concrete destinations and merge with
    /// `individual`. After check-legality filtering `sliding` is always
    /// empty, so this is only ever non-trivial for an `ignore_check` query.
    pub fn all_candidates(&self) -> Vec<CandidateMove> {
        let mut out = self.individual.clone();
        for (&dir, &(neg, pos)) in &self.sliding {
            let pos_cap = if pos == UNBOUNDED_POS { SLIDING_EXPANSION_CAP } else { pos };
            for step in 1..=pos_cap.max(0) {
                out.push(CandidateMove::plain(self.origin + dir * step));
            }
            let neg_cap = if neg == UNBOUNDED_NEG { SLIDING_EXPANSION_CAP } else { -neg };
            for step in 1..=neg_cap.max(0) {
                out.push(CandidateMove::plain(self.origin - dir * step));
            }
        }
        out
    }
}

fn dir_norm2(dir: Coord) -> i64 {
    dir.x * dir.x + dir.y * dir.y
}

/// Walk the organized line through `piece` in direction `dir` and return the
/// furthest reachable step in each direction, honoring `blocking`/`ignore`.
fn compute_sliding_limits(board: &Board, piece: &Piece, dir: Coord) -> (i64, i64) {
    let descriptor = moveset_for(piece.piece_type);
    let mover = piece.piece_type.get_color();
    let Some(line) = board.line_through(dir, piece.coords) else {
        return (UNBOUNDED_NEG, UNBOUNDED_POS);
    };
    let norm2 = dir_norm2(dir);
    let key = Board::dot_along(piece.coords, dir);

    let mut pos_limit = UNBOUNDED_POS;
    for (&k, &coord) in line.range((key + 1)..) {
        let occupant = board.piece_at(coord).expect("organized line entries are always occupied");
        if (descriptor.ignore)(piece.piece_type, coord) {
            continue;
        }
        let steps = (k - key) / norm2;
        match (descriptor.blocking)(mover, occupant.piece_type) {
            BlockResult::Transparent => continue,
            BlockResult::BlockedBefore => pos_limit = steps - 1,
            BlockResult::BlockedAfter => pos_limit = steps,
        }
        break;
    }

    let mut neg_limit = UNBOUNDED_NEG;
    for (&k, &coord) in line.range(..key).rev() {
        let occupant = board.piece_at(coord).expect("organized line entries are always occupied");
        if (descriptor.ignore)(piece.piece_type, coord) {
            continue;
        }
        let steps = (k - key) / norm2; // negative
        match (descriptor.blocking)(mover, occupant.piece_type) {
            BlockResult::Transparent => continue,
            BlockResult::BlockedBefore => neg_limit = steps + 1,
            BlockResult::BlockedAfter => neg_limit = steps,
        }
        break;
    }

    (neg_limit, pos_limit)
}

fn jump_destinations(board: &Board, piece: &Piece) -> Vec<CandidateMove> {
    let descriptor = moveset_for(piece.piece_type);
    let mover = piece.piece_type.get_color();
    let mut out = Vec::new();
    for &offset in &descriptor.individual {
        let Some(dest) = piece.coords.checked_add(offset) else { continue };
        if (descriptor.ignore)(piece.piece_type, dest) {
            out.push(CandidateMove::plain(dest));
            continue;
        }
        match board.piece_at(dest) {
            None => out.push(CandidateMove::plain(dest)),
            Some(occupant) => {
                if (descriptor.blocking)(mover, occupant.piece_type) == BlockResult::BlockedAfter {
                    out.push(CandidateMove::plain(dest));
                }
            }
        }
    }
    out
}

/// `calculate(board, piece, opts)`: the full entry point for C3.
pub fn calculate(board: &Board, piece: &Piece, query: MovesetQuery) -> GeneratedMoveset {
    let descriptor = moveset_for(piece.piece_type);
    let mut generated = GeneratedMoveset { origin: piece.coords, individual: Vec::new(), sliding: HashMap::new() };

    if !query.only_specials {
        generated.individual.extend(jump_destinations(board, piece));
        for &dir in &descriptor.sliding {
            generated.sliding.insert(dir, compute_sliding_limits(board, piece, dir));
        }
    }

    match descriptor.special {
        Some(SpecialKind::Pawn) => generated.individual.extend(pawn_moves(board, piece)),
        Some(SpecialKind::King) => generated.individual.extend(king_castle_moves(board, piece)),
        Some(SpecialKind::Rose) => generated.individual.extend(rose_moves(board, piece)),
        None => {}
    }

    if query.ignore_check {
        generated
    } else {
        crate::resolve::remove_check_invalid_moves(board, generated, piece)
    }
}

fn forward_for(player: Player) -> i64 {
    match player {
        Player::White => 1,
        Player::Black => -1,
        Player::Neutral => 0,
    }
}

fn pawn_moves(board: &Board, piece: &Piece) -> Vec<CandidateMove> {
    let player = piece.piece_type.get_color();
    let forward = forward_for(player);
    let promotion_ranks = board.rules().promotion_ranks_for(player);
    let mut out = Vec::new();

    let one_step = piece.coords + Coord::new(0, forward);
    if board.is_empty(one_step) {
        let mut c = CandidateMove::plain(one_step);
        c.promote_trigger = promotion_ranks.contains(&one_step.y);
        out.push(c);

        let two_step = piece.coords + Coord::new(0, 2 * forward);
        if board.has_special_right(piece.coords) && board.is_empty(two_step) {
            let mut c = CandidateMove::plain(two_step);
            c.enpassant_create = Some(EnPassantState { square: one_step, pawn: two_step });
            out.push(c);
        }
    }

    for dx in [-1i64, 1] {
        let dest = piece.coords + Coord::new(dx, forward);
        if let Some(occupant) = board.piece_at(dest) {
            if occupant.piece_type.get_color() != player {
                let mut c = CandidateMove::plain(dest);
                c.promote_trigger = promotion_ranks.contains(&dest.y);
                out.push(c);
            }
        } else if let Some(ep) = board.en_passant() {
            if ep.square == dest {
                if let Some(victim) = board.piece_at(ep.pawn) {
                    if victim.piece_type.get_raw() == RawType::Pawn && victim.piece_type.get_color() != player {
                        let mut c = CandidateMove::plain(dest);
                        c.enpassant = true;
                        out.push(c);
                    }
                }
            }
        }
    }

    out
}

/// Finds the nearest same-rank piece in direction `dir` (`+1`/`-1` along the
/// x-axis) that can still castle with the king: unmoved, at least two empty
/// squares away, and not a pawn or a jumping royal (a royal whose moveset has
/// no sliding component — ordinary kings in other variants).
fn castle_partner(board: &Board, king: &Piece, dir: i64) -> Option<(Coord, i64)> {
    let rank_dir = Coord::new(1, 0);
    let line = board.line_through(rank_dir, king.coords)?;
    let key = Board::dot_along(king.coords, rank_dir);
    let (&k, &coord) = if dir > 0 {
        line.range((key + 1)..).next()?
    } else {
        line.range(..key).next_back()?
    };
    let steps = k - key; // rank_dir has norm2 == 1
    if steps.abs() < 3 {
        return None;
    }
    let partner = board.piece_at(coord)?;
    if partner.piece_type.get_color() != king.piece_type.get_color() {
        return None;
    }
    let raw = partner.piece_type.get_raw();
    if raw == RawType::Pawn {
        return None;
    }
    let partner_descriptor = moveset_for(partner.piece_type);
    if raw.is_royal() && partner_descriptor.sliding.is_empty() {
        return None; // jumping royal
    }
    if !board.has_special_right(coord) {
        return None;
    }
    Some((coord, steps.signum()))
}

fn king_castle_moves(board: &Board, king: &Piece) -> Vec<CandidateMove> {
    let mut out = Vec::new();
    if !board.has_special_right(king.coords) {
        return out;
    }
    let opponent = !king.piece_type.get_color();
    if crate::check::is_square_attacked(board, king.coords, opponent) {
        return out; // cannot castle out of check
    }

    for dir in [1i64, -1] {
        let Some((partner_coord, dir)) = castle_partner(board, king, dir) else { continue };
        let step = Coord::new(dir, 0);
        let pass_through = king.coords + step;
        let landing = king.coords + step * 2;
        if crate::check::is_square_attacked(board, pass_through, opponent)
            || crate::check::is_square_attacked(board, landing, opponent)
        {
            continue;
        }
        out.push(CandidateMove {
            coords: landing,
            enpassant: false,
            enpassant_create: None,
            promote_trigger: false,
            castle: Some(CastleInfo { dir, rook_from: partner_coord, rook_to: king.coords + step }),
            path: None,
        });
    }
    out
}

const ROSE_SPOKES: [Coord; 8] = [
    Coord::new(1, 2), Coord::new(2, 1), Coord::new(2, -1), Coord::new(1, -2),
    Coord::new(-1, -2), Coord::new(-2, -1), Coord::new(-2, 1), Coord::new(-1, 2),
];

const ROSE_ARM_LENGTH: usize = 7;

/// Eight starting knight-vectors, walked in either rotational direction
/// around `ROSE_SPOKES`, stepping to the next vector in the sequence each
/// waypoint (the "curving" knight path). Blocked by any piece; captures the
/// first enemy it meets and stops there. Destinations reachable by more than
/// one spiral arm keep only the shortest path; ties break on the lower
/// starting-spoke index, a deterministic rule rather than a reconstruction
/// of the original "curves toward the board center" tie-break, which no
/// surviving source material specified precisely.
fn rose_moves(board: &Board, piece: &Piece) -> Vec<CandidateMove> {
    let player = piece.piece_type.get_color();
    let mut best: HashMap<Coord, (usize, usize, Vec<Coord>)> = HashMap::new(); // dest -> (path_len, spoke_index, path)

    for (spoke_index, _) in ROSE_SPOKES.iter().enumerate() {
        for &rotation in &[1i64, -1] {
            let mut pos = piece.coords;
            let mut idx = spoke_index as i64;
            let mut path = Vec::new();
            for _ in 0..ROSE_ARM_LENGTH {
                idx = idx.rem_euclid(8);
                let offset = ROSE_SPOKES[idx as usize];
                let Some(next) = pos.checked_add(offset) else { break };
                path.push(next);
                match board.piece_at(next) {
                    None => {
                        pos = next;
                    }
                    Some(occupant) => {
                        if occupant.piece_type.get_color() != player {
                            record_rose_destination(&mut best, next, spoke_index, &path);
                        }
                        break;
                    }
                }
                record_rose_destination(&mut best, pos, spoke_index, &path);
                idx += rotation;
            }
        }
    }

    best.into_values()
        .map(|(_, _, path)| {
            let mut c = CandidateMove::plain(*path.last().expect("non-empty rose path"));
            c.path = Some(path);
            c
        })
        .collect()
}

fn record_rose_destination(
    best: &mut HashMap<Coord, (usize, usize, Vec<Coord>)>,
    dest: Coord,
    spoke_index: usize,
    path: &[Coord],
) {
    let candidate = (path.len(), spoke_index, path.to_vec());
    match best.get(&dest) {
        Some(existing) if (existing.0, existing.1) <= (candidate.0, candidate.1) => {}
        _ => {
            best.insert(dest, candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece_type::PieceType;
    use crate::raw_type::RawType;

    #[test]
    fn starting_knight_has_two_legal_jumps() {
        let board = Board::starting_position();
        let knight = *board.piece_at(Coord::new(2, 1)).unwrap();
        let generated = calculate(&board, &knight, MovesetQuery::default());
        assert_eq!(generated.individual.len(), 2);
    }

    #[test]
    fn starting_pawn_has_two_pushes() {
        let board = Board::starting_position();
        let pawn = *board.piece_at(Coord::new(5, 2)).unwrap();
        let generated = calculate(&board, &pawn, MovesetQuery::default());
        assert_eq!(generated.individual.len(), 2);
        assert!(generated.individual.iter().any(|c| c.enpassant_create.is_some()));
    }

    #[test]
    fn starting_rook_is_fully_blocked() {
        let board = Board::starting_position();
        let rook = *board.piece_at(Coord::new(1, 1)).unwrap();
        let generated = calculate(&board, &rook, MovesetQuery::default());
        assert!(generated.all_candidates().is_empty());
    }

    #[test]
    fn king_has_no_castle_rights_through_blocking_pieces() {
        let board = Board::starting_position();
        let king = *board.piece_at(Coord::new(5, 1)).unwrap();
        let moves = king_castle_moves(&board, &king);
        assert!(moves.is_empty());
    }

    #[test]
    fn knight_cannot_land_on_a_void_marker() {
        let placement = vec![
            (Coord::new(4, 4), PieceType::build(RawType::Knight, Player::White)),
            (Coord::new(6, 5), PieceType::build(RawType::Void, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), crate::rules::GameRules::standard_chess());
        let knight = *board.piece_at(Coord::new(4, 4)).unwrap();
        let generated = calculate(&board, &knight, MovesetQuery { ignore_check: true, ..Default::default() });
        assert!(!generated.individual.iter().any(|c| c.coords == Coord::new(6, 5)));
    }

    #[test]
    fn rook_cannot_slide_through_or_onto_a_void_marker() {
        let placement = vec![
            (Coord::new(1, 1), PieceType::build(RawType::Rook, Player::White)),
            (Coord::new(1, 4), PieceType::build(RawType::Void, Player::Black)),
        ];
        let board = Board::new(placement, Default::default(), crate::rules::GameRules::standard_chess());
        let rook = *board.piece_at(Coord::new(1, 1)).unwrap();
        let generated = calculate(&board, &rook, MovesetQuery { ignore_check: true, ..Default::default() });
        let destinations: Vec<Coord> = generated.all_candidates().iter().map(|c| c.coords).collect();
        assert!(destinations.contains(&Coord::new(1, 2)));
        assert!(destinations.contains(&Coord::new(1, 3)));
        assert!(!destinations.contains(&Coord::new(1, 4)));
        assert!(!destinations.contains(&Coord::new(1, 5)));
    }

    #[test]
    fn rose_on_empty_board_reaches_multiple_rings() {
        let placement = vec![(Coord::new(0, 0), PieceType::build(RawType::Rose, Player::White))];
        let board = Board::new(placement, Default::default(), crate::rules::GameRules::standard_chess());
        let rose = *board.piece_at(Coord::new(0, 0)).unwrap();
        let moves = rose_moves(&board, &rose);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|c| c.path.as_ref().unwrap().len() <= ROSE_ARM_LENGTH));
    }
}
