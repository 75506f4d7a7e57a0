//! The type-independent-of-color part of a piece: what it is, not whose it is.

use std::fmt;

/// The "shape" of a piece, independent of which player owns it.
///
/// `Void` occupies a square but participates in no moveset (used as an
/// impassable marker by some variant generators); it is distinct from an
/// empty square, which has no piece at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RawType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
    Rose = 6,
    Void = 7,
}

impl RawType {
    pub const COUNT: usize = 8;
    pub const ALL: [RawType; 8] = [
        RawType::Pawn,
        RawType::Knight,
        RawType::Bishop,
        RawType::Rook,
        RawType::Queen,
        RawType::King,
        RawType::Rose,
        RawType::Void,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this type is a royal piece under the default rule set (its
    /// capture, or check, ends the game depending on win conditions).
    #[inline]
    pub const fn is_royal(self) -> bool {
        matches!(self, RawType::King)
    }

    #[inline]
    pub const fn from_fen_char(c: char) -> Option<RawType> {
        match c.to_ascii_lowercase() {
            'p' => Some(RawType::Pawn),
            'n' => Some(RawType::Knight),
            'b' => Some(RawType::Bishop),
            'r' => Some(RawType::Rook),
            'q' => Some(RawType::Queen),
            'k' => Some(RawType::King),
            'o' => Some(RawType::Rose),
            'v' => Some(RawType::Void),
            _ => None,
        }
    }

    #[inline]
    pub const fn fen_char(self) -> char {
        match self {
            RawType::Pawn => 'p',
            RawType::Knight => 'n',
            RawType::Bishop => 'b',
            RawType::Rook => 'r',
            RawType::Queen => 'q',
            RawType::King => 'k',
            RawType::Rose => 'o',
            RawType::Void => 'v',
        }
    }

    /// Standard centipawn value for the evaluator; unknown/non-standard
    /// types (i.e. anything without an obvious classical analogue) default
    /// to 0.
    #[inline]
    pub const fn material_value(self) -> i32 {
        match self {
            RawType::Pawn => 100,
            RawType::Knight => 320,
            RawType::Bishop => 330,
            RawType::Rook => 500,
            RawType::Queen => 900,
            RawType::King => 0,
            RawType::Rose => 700,
            RawType::Void => 0,
        }
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen_char())
    }
}

#[cfg(test)]
mod tests {
    use super::RawType;

    #[test]
    fn fen_char_roundtrip() {
        for rt in RawType::ALL {
            let c = rt.fen_char();
            assert_eq!(RawType::from_fen_char(c), Some(rt));
        }
    }

    #[test]
    fn royal_is_only_king() {
        for rt in RawType::ALL {
            assert_eq!(rt.is_royal(), rt == RawType::King);
        }
    }
}
