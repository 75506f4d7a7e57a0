//! JSON message shapes for the worker's line-delimited protocol.

use serde::{Deserialize, Serialize};

use farchess_core::{Coord, MoveDraft, RawType};

/// The `lf` payload's fields: a position (ICN placement plus the turn and
/// special-rights set ICN itself doesn't carry) and nothing else — rules
/// are fixed to standard chess at worker build time (see
/// [`crate::position`]).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LfPayload {
    pub placement: String,
    pub turn: String,
    #[serde(default)]
    pub special_rights: Vec<String>,
}

/// `{ lf: <payload> }` — the only inbound message shape the worker accepts.
#[derive(Debug, Clone, Deserialize)]
pub struct InMessage {
    pub lf: LfPayload,
}

/// The wire form of a [`MoveDraft`]: coordinates as `"x,y"` strings (the
/// same convention [`farchess_core::format_move`] uses) and promotion as a
/// FEN letter, so the payload stays readable without inventing a new
/// coordinate encoding.
#[derive(Debug, Clone, Serialize)]
pub struct MoveDraftWire {
    pub start: String,
    pub end: String,
    pub promotion: Option<char>,
}

impl From<MoveDraft> for MoveDraftWire {
    fn from(draft: MoveDraft) -> Self {
        MoveDraftWire {
            start: draft.start.to_string(),
            end: draft.end.to_string(),
            promotion: draft.promotion.map(RawType::fen_char),
        }
    }
}

impl MoveDraftWire {
    /// Parse back into a [`MoveDraft`] — exercised by tests to check the
    /// wire form actually round-trips.
    pub fn to_draft(&self) -> Option<MoveDraft> {
        let start: Coord = self.start.parse().ok()?;
        let end: Coord = self.end.parse().ok()?;
        let promotion = match self.promotion {
            Some(c) => Some(RawType::from_fen_char(c)?),
            None => None,
        };
        Some(MoveDraft { start, end, promotion })
    }
}
