//! Compact move notation (`S>E[P]`) and ICN-style position notation
//! (`type x,y | type x,y | ...`).

use crate::coord::Coord;
use crate::chess_move::Move;
use crate::error::NotationError;
use crate::exec::MoveDraft;
use crate::piece_type::PieceType;
use crate::player::Player;
use crate::raw_type::RawType;

/// `S>E[P]`: start coordinate, `>`, end coordinate, optional trailing
/// promotion letter.
pub fn format_move(mv: &Move) -> String {
    match mv.promotion {
        Some(promo) => format!("{}>{}{}", mv.start, mv.end, promo.fen_char()),
        None => format!("{}>{}", mv.start, mv.end),
    }
}

pub fn parse_move_draft(s: &str) -> Result<MoveDraft, NotationError> {
    let (start_str, rest) = s
        .split_once('>')
        .ok_or_else(|| NotationError::MalformedMove { found: s.to_string() })?;
    let start: Coord = start_str
        .parse()
        .map_err(|_| NotationError::MalformedMove { found: s.to_string() })?;

    let (end_str, promotion) = match rest.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => {
            let letter = c;
            let raw = RawType::from_fen_char(letter)
                .ok_or(NotationError::UnknownPromotionLetter { character: letter })?;
            (&rest[..rest.len() - 1], Some(raw))
        }
        _ => (rest, None),
    };
    let end: Coord = end_str
        .parse()
        .map_err(|_| NotationError::MalformedMove { found: s.to_string() })?;

    Ok(MoveDraft { start, end, promotion })
}

/// A single piece letter for ICN notation: uppercase for White, lowercase
/// for Black, `~`-prefixed (always lowercase) for Neutral — the source
/// duck-typed format has no neutral seat, so this prefix is our own
/// unambiguous extension rather than a literal reproduction of it.
fn icn_letter(piece_type: PieceType) -> String {
    let (raw, player) = piece_type.split();
    let letter = raw.fen_char();
    match player {
        Player::White => letter.to_ascii_uppercase().to_string(),
        Player::Black => letter.to_string(),
        Player::Neutral => format!("~{letter}"),
    }
}

fn parse_icn_letter(token: &str) -> Result<PieceType, NotationError> {
    if let Some(rest) = token.strip_prefix('~') {
        let c = rest
            .chars()
            .next()
            .ok_or_else(|| NotationError::MalformedIcnToken { found: token.to_string() })?;
        let raw = RawType::from_fen_char(c).ok_or(NotationError::UnknownPieceLetter { character: c })?;
        return Ok(PieceType::build(raw, Player::Neutral));
    }
    let c = token
        .chars()
        .next()
        .ok_or_else(|| NotationError::MalformedIcnToken { found: token.to_string() })?;
    let raw = RawType::from_fen_char(c).ok_or(NotationError::UnknownPieceLetter { character: c })?;
    let player = if c.is_ascii_uppercase() { Player::White } else { Player::Black };
    Ok(PieceType::build(raw, player))
}

/// `type x,y | type x,y | ...`, one token per occupied square. Carries piece
/// placement only — special rights, turn, and move-rule state live outside
/// ICN and are supplied separately when reconstructing a [`crate::board::Board`].
pub fn format_icn(placement: &[(Coord, PieceType)]) -> String {
    let mut sorted: Vec<_> = placement.to_vec();
    sorted.sort_by_key(|&(c, _)| (c.x, c.y));
    sorted
        .into_iter()
        .map(|(c, pt)| format!("{} {c}", icn_letter(pt)))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn parse_icn(s: &str) -> Result<Vec<(Coord, PieceType)>, NotationError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split('|')
        .map(|token| {
            let token = token.trim();
            let (piece_tok, coord_tok) = token
                .split_once(' ')
                .ok_or_else(|| NotationError::MalformedIcnToken { found: token.to_string() })?;
            let piece_type = parse_icn_letter(piece_tok)?;
            let coord: Coord = coord_tok
                .trim()
                .parse()
                .map_err(|_| NotationError::MalformedIcnToken { found: token.to_string() })?;
            Ok((coord, piece_type))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_type::RawType;

    #[test]
    fn icn_roundtrip() {
        let placement = vec![
            (Coord::new(5, 1), PieceType::build(RawType::King, Player::White)),
            (Coord::new(5, 8), PieceType::build(RawType::King, Player::Black)),
            (Coord::new(0, 0), PieceType::build(RawType::Rose, Player::Neutral)),
        ];
        let s = format_icn(&placement);
        let parsed = parse_icn(&s).unwrap();
        let mut expected = placement;
        expected.sort_by_key(|&(c, _)| (c.x, c.y));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn compact_move_without_promotion() {
        let draft = parse_move_draft("5,2>5,4").unwrap();
        assert_eq!(draft.start, Coord::new(5, 2));
        assert_eq!(draft.end, Coord::new(5, 4));
        assert_eq!(draft.promotion, None);
    }

    #[test]
    fn compact_move_with_promotion() {
        let draft = parse_move_draft("7,7>7,8q").unwrap();
        assert_eq!(draft.end, Coord::new(7, 8));
        assert_eq!(draft.promotion, Some(RawType::Queen));
    }

    #[test]
    fn malformed_move_is_rejected() {
        assert!(parse_move_draft("not-a-move").is_err());
    }
}
