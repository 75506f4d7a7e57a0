//! Worker protocol errors.

use farchess_core::{MoveError, NotationError};

/// Errors that can occur while framing or decoding a worker message.
///
/// Every variant here is recoverable: the worker logs it with `warn!` and
/// moves on to the next line, per the protocol's "no structured failure
/// channel" contract. A [`farchess_core::CoreError::Invariant`] surfacing
/// from search is a different, fatal class this type deliberately does not
/// model — that one halts the process instead of being caught here.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A line of input was not valid JSON, or didn't match the expected
    /// `{ lf: ... }` shape.
    #[error("malformed worker message: {0}")]
    Protocol(#[from] serde_json::Error),

    /// The `lf` payload's position notation failed to parse.
    #[error("invalid position notation: {0}")]
    Notation(#[from] NotationError),

    /// The `lf` payload named a turn other than `"w"`/`"b"`.
    #[error("unrecognized turn marker: {found}")]
    UnknownTurn { found: String },

    /// No legal move exists from the decoded position (checkmate or
    /// stalemate) — not an error exactly, but the worker has nothing to
    /// reply with beyond logging it.
    #[error("no legal move from the supplied position")]
    NoLegalMove,

    /// A move built during search failed to apply against the position it
    /// was generated from.
    #[error("move application failed: {0}")]
    Move(#[from] MoveError),

    /// An I/O error occurred while reading from stdin or writing to stdout.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
