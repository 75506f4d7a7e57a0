//! Move Executor: apply/undo moves with full, ordered state rewind.

use crate::board::Board;
use crate::check::detect_check;
use crate::chess_move::{CastleInfo, Change, Move, MoveKind, StateUpdate};
use crate::coord::Coord;
use crate::error::{CoreError, MoveError};
use crate::movegen::{calculate, CandidateMove, MovesetQuery};
use crate::piece::Piece;
use crate::raw_type::RawType;

/// A bare move request from a caller that doesn't know (or care about) the
/// move's special flags — the worker protocol, notation parsing, and tests
/// all hand these in; the executor reconstructs the rest by intersecting
/// the draft against the legal candidates at the current board state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDraft {
    pub start: Coord,
    pub end: Coord,
    pub promotion: Option<RawType>,
}

/// `generateMove`: resolve a draft against the current legal moves for the
/// piece at its start square, and build a fully-populated [`Move`].
pub fn generate_move(board: &Board, draft: MoveDraft) -> Result<Move, MoveError> {
    let piece = *board
        .piece_at(draft.start)
        .ok_or(MoveError::EmptyStart { coords: draft.start })?;
    if piece.piece_type.get_color() != board.turn() {
        return Err(MoveError::WrongColor { coords: draft.start });
    }

    let generated = calculate(board, &piece, MovesetQuery { only_specials: false, ignore_check: false });
    let candidate = generated
        .all_candidates()
        .into_iter()
        .find(|c| c.coords == draft.end)
        .ok_or(MoveError::UnreachableEnd { from: draft.start, coords: draft.end })?;

    if candidate.promote_trigger {
        let player = piece.piece_type.get_color();
        let allowed = board.rules().promotions_allowed_for(player);
        match draft.promotion {
            Some(rt) if allowed.contains(&rt) => {}
            _ => return Err(MoveError::IllegalPromotion { requested: "unspecified-or-disallowed" }),
        }
    }

    Ok(build_move(board, &piece, &candidate, draft.promotion))
}

/// Build a fully-populated [`Move`] from an already-verified legal candidate.
/// Used both by [`generate_move`] and internally by the search/check-resolver,
/// which already know the candidate is legal and don't need to re-derive it.
pub fn build_move(board: &Board, piece: &Piece, candidate: &CandidateMove, promotion: Option<RawType>) -> Move {
    let start = piece.coords;
    let end = candidate.coords;
    let mut changes = Vec::new();
    let mut state_updates = Vec::new();
    let mut kind = MoveKind::Normal;
    let mut is_capture = false;

    state_updates.push(StateUpdate::EnPassant { prev: board.en_passant() });

    if candidate.enpassant {
        let captured_coord = board
            .en_passant()
            .expect("enpassant candidate implies board.en_passant is set")
            .pawn;
        let captured = *board.piece_at(captured_coord).expect("enpassant victim must be present");
        changes.push(Change::Delete { at: captured_coord, piece: captured });
        changes.push(Change::MovePiece { from: start, to: end });
        kind = MoveKind::EnPassant;
        is_capture = true;
    } else if let Some(occupant) = board.piece_at(end) {
        changes.push(Change::Capture { at: end, captured: *occupant });
        changes.push(Change::MovePiece { from: start, to: end });
        kind = MoveKind::Capture;
        is_capture = true;
    } else {
        changes.push(Change::MovePiece { from: start, to: end });
    }

    if let Some(promo) = promotion.filter(|_| candidate.promote_trigger) {
        // Promotion is represented as delete-then-add so undo needs no
        // special case: the pawn that "became" a queen never existed after
        // this move, and reappears verbatim on rewind.
        changes.push(Change::Delete { at: end, piece: Piece::new(piece.piece_type, end, piece.index) });
        let promoted_type = crate::piece_type::PieceType::build(promo, piece.piece_type.get_color());
        changes.push(Change::Add { at: end, piece: Piece::new(promoted_type, end, piece.index) });
        kind = MoveKind::Promotion;
    }

    let mut castle_info: Option<CastleInfo> = None;
    if let Some(castle) = candidate.castle {
        changes.push(Change::MovePiece { from: castle.rook_from, to: castle.rook_to });
        castle_info = Some(castle);
        kind = MoveKind::Castle;
    }

    for &coord in &[start, end] {
        if board.has_special_right(coord) {
            state_updates.push(StateUpdate::SpecialRight { coord, had_right: true });
        }
    }
    if let Some(castle) = candidate.castle {
        if board.has_special_right(castle.rook_from) {
            state_updates.push(StateUpdate::SpecialRight { coord: castle.rook_from, had_right: true });
        }
    }
    if is_capture {
        if let Some(ep) = candidate.enpassant.then_some(()).and(board.en_passant()) {
            if board.has_special_right(ep.pawn) {
                state_updates.push(StateUpdate::SpecialRight { coord: ep.pawn, had_right: true });
            }
        }
    }

    state_updates.push(StateUpdate::MoveRule { prev: board.move_rule_counter() });
    state_updates.push(StateUpdate::TurnCursor { prev: board.turn() });
    state_updates.push(StateUpdate::Check { prev_in_check: board.in_check(), prev_attackers: board.attackers().to_vec() });

    Move {
        start,
        end,
        piece_type: piece.piece_type,
        kind,
        promotion: promotion.filter(|_| candidate.promote_trigger),
        castle: castle_info,
        enpassant: candidate.enpassant,
        enpassant_create: candidate.enpassant_create,
        path: candidate.path.clone(),
        changes,
        state_updates,
        generate_index: board.move_index() + 1,
        gives_check: false,
        is_mate: false,
        is_capture,
    }
}

/// `makeMove`: apply a generated move's changes and state updates forward,
/// advance the turn cursor, and recompute check/attackers for the new side
/// to move.
pub fn make_move(board: &mut Board, mv: Move) -> Result<(), CoreError> {
    let expected = board.move_index() + 1;
    if mv.generate_index != expected {
        return Err(CoreError::DesyncedApply { expected, found: mv.generate_index });
    }

    let is_pawn_or_capture =
        mv.is_capture || matches!(mv.kind, MoveKind::Promotion) || mv.piece_type.get_raw() == RawType::Pawn;
    for change in &mv.changes {
        apply_change_forward(board, change);
    }
    for update in &mv.state_updates {
        apply_state_forward(board, update, &mv);
    }

    board.set_turn(board.rules().next_turn(board.turn()));

    let color_to_move = board.turn();
    let detected = detect_check(board, color_to_move, true);
    board.set_in_check(detected.check, detected.attackers);

    if is_pawn_or_capture {
        board.set_move_rule_counter(0);
    } else {
        board.set_move_rule_counter(board.move_rule_counter() + 1);
    }

    board.push_move(mv);
    Ok(())
}

/// `rewindMove`: undo the most recently applied move, restoring
/// byte-identical prior state.
pub fn rewind_move(board: &mut Board) -> Result<(), CoreError> {
    let mv = board
        .pop_move()
        .ok_or(CoreError::Invariant("rewindMove called with an empty move list"))?;

    for update in mv.state_updates.iter().rev() {
        apply_state_backward(board, update);
    }
    for change in mv.changes.iter().rev() {
        apply_change_backward(board, change);
    }
    Ok(())
}

/// generate -> make -> `f` -> rewind, guaranteeing the board returns to its
/// pre-call state even if `f` short-circuits via `?` (the rewind always
/// runs because the caller never early-returns between make and rewind).
pub fn simulate_move_wrapper<R>(
    board: &mut Board,
    draft: MoveDraft,
    f: impl FnOnce(&mut Board) -> R,
) -> Result<R, MoveError> {
    let mv = generate_move(board, draft)?;
    make_move(board, mv).expect("freshly generated move cannot desync");
    let result = f(board);
    rewind_move(board).expect("rewind of a move we just made cannot fail");
    Ok(result)
}

/// Like [`simulate_move_wrapper`] but takes an already-built [`Move`]
/// (candidate moves produced internally by C3/C5 skip draft re-resolution).
pub fn simulate_prebuilt<R>(board: &mut Board, mv: Move, f: impl FnOnce(&mut Board) -> R) -> R {
    make_move(board, mv).expect("internally generated move cannot desync");
    let result = f(board);
    rewind_move(board).expect("rewind of a move we just made cannot fail");
    result
}

/// What [`make_null_move`] needs to hand back to [`rewind_null_move`]: a
/// null move touches no piece, so there is nothing to log on the move list,
/// just the two bits of board state it overwrites.
#[derive(Debug, Clone, Copy)]
pub struct NullMoveUndo {
    prev_turn: crate::player::Player,
    prev_en_passant: Option<crate::board::EnPassantState>,
}

/// Pass the turn without moving a piece, for null-move pruning in search.
/// Clears en passant (no pawn just double-pushed) and flips the turn
/// cursor; does not touch the move list or move-rule counter, since a null
/// move is never recorded as part of the game's real history.
pub fn make_null_move(board: &mut Board) -> NullMoveUndo {
    let undo = NullMoveUndo { prev_turn: board.turn(), prev_en_passant: board.en_passant() };
    board.set_en_passant(None);
    board.set_turn(board.rules().next_turn(board.turn()));
    undo
}

/// Undo a [`make_null_move`].
pub fn rewind_null_move(board: &mut Board, undo: NullMoveUndo) {
    board.set_turn(undo.prev_turn);
    board.set_en_passant(undo.prev_en_passant);
}

fn apply_change_forward(board: &mut Board, change: &Change) {
    match *change {
        Change::MovePiece { from, to } => {
            let piece = board.remove_piece(from).expect("move source must be occupied");
            board.insert_piece(to, piece.piece_type);
        }
        Change::Capture { at, .. } => {
            board.remove_piece(at).expect("capture target must be occupied");
        }
        Change::Delete { at, .. } => {
            board.remove_piece(at).expect("delete target must be occupied");
        }
        Change::Add { at, piece } => {
            board.insert_piece(at, piece.piece_type);
        }
    }
}

fn apply_change_backward(board: &mut Board, change: &Change) {
    match *change {
        Change::MovePiece { from, to } => {
            let piece = board.remove_piece(to).expect("move destination must be occupied");
            board.insert_piece(from, piece.piece_type);
        }
        Change::Capture { at, captured } => {
            board.insert_piece(at, captured.piece_type);
        }
        Change::Delete { at, piece } => {
            board.insert_piece(at, piece.piece_type);
        }
        Change::Add { at, .. } => {
            board.remove_piece(at).expect("added piece must be present to undo");
        }
    }
}

fn apply_state_forward(board: &mut Board, update: &StateUpdate, mv: &Move) {
    match *update {
        StateUpdate::EnPassant { .. } => board.set_en_passant(mv.enpassant_create),
        StateUpdate::SpecialRight { coord, had_right } => {
            if had_right {
                board.revoke_special_right(coord);
            }
        }
        StateUpdate::MoveRule { .. } => {}
        StateUpdate::TurnCursor { .. } => {}
        StateUpdate::Check { .. } => {}
    }
}

fn apply_state_backward(board: &mut Board, update: &StateUpdate) {
    match update {
        StateUpdate::EnPassant { prev } => board.set_en_passant(*prev),
        StateUpdate::SpecialRight { coord, had_right } => {
            if *had_right {
                board.grant_special_right(*coord);
            }
        }
        StateUpdate::MoveRule { prev } => board.set_move_rule_counter(*prev),
        StateUpdate::TurnCursor { prev } => board.set_turn(*prev),
        StateUpdate::Check { prev_in_check, prev_attackers } => {
            board.set_in_check(*prev_in_check, prev_attackers.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn make_then_rewind_restores_hash() {
        let mut board = Board::starting_position();
        let hash_before = board.hash();
        let draft = MoveDraft { start: Coord::new(5, 2), end: Coord::new(5, 4), promotion: None };
        let mv = generate_move(&board, draft).unwrap();
        make_move(&mut board, mv).unwrap();
        assert_ne!(board.hash(), hash_before);
        rewind_move(&mut board).unwrap();
        assert_eq!(board.hash(), hash_before);
        assert_eq!(board.move_index(), 0);
    }

    #[test]
    fn quiet_pawn_push_resets_move_rule_counter() {
        let mut board = Board::starting_position();
        // A quiet knight move first, to move the counter off zero.
        let knight_draft = MoveDraft { start: Coord::new(2, 1), end: Coord::new(3, 3), promotion: None };
        let knight_mv = generate_move(&board, knight_draft).unwrap();
        make_move(&mut board, knight_mv).unwrap();
        assert_eq!(board.move_rule_counter(), 1);

        // A quiet pawn push, which is neither a capture nor a promotion,
        // must still reset the counter back to zero.
        let pawn_draft = MoveDraft { start: Coord::new(5, 7), end: Coord::new(5, 5), promotion: None };
        let pawn_mv = generate_move(&board, pawn_draft).unwrap();
        make_move(&mut board, pawn_mv).unwrap();
        assert_eq!(board.move_rule_counter(), 0);
    }

    #[test]
    fn desynced_apply_is_rejected() {
        let board = Board::starting_position();
        let draft = MoveDraft { start: Coord::new(5, 2), end: Coord::new(5, 4), promotion: None };
        let mut mv = generate_move(&board, draft).unwrap();
        mv.generate_index = 99;
        let mut board2 = board.clone();
        assert!(make_move(&mut board2, mv).is_err());
    }
}
