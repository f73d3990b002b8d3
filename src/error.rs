//! Typed errors at the system's boundaries.
//!
//! The engine's own control values (`Solved`/`Unsolved`/`Conflict`/
//! `ManySolution`/`Timeout`, see [`crate::status::Status`]) are never
//! `Error`s — they're expected outcomes returned in-band. These types cover
//! what actually can't be recovered from: malformed input and broken
//! checkpoint I/O.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("puzzle record {0} is missing its column/row clue lines")]
    Truncated(usize),

    #[error("clue line {line} exceeds board size: runs sum to at least {min_length}, board side is {n}")]
    ClueTooLong {
        line: usize,
        min_length: usize,
        n: usize,
    },

    #[error("invalid run length token {token:?} on line {line}")]
    InvalidToken { line: usize, token: String },

    #[error("board side {0} exceeds the supported maximum of {1}")]
    BoardTooLarge(usize, usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed")]
    Io(#[from] std::io::Error),

    #[error("checkpoint is corrupt or from an incompatible version")]
    Decode(#[from] bincode::Error),
}
