//! Error types crossing the store and session seams.
//!
//! Store errors never stop a quiz: the session logs them and keeps the
//! round timeline moving. Session errors describe how a quiz ended early.

use thiserror::Error;

/// Errors a word store can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user is signed in, so progress cannot be written.
    #[error("word store requires an authenticated user")]
    Unauthenticated,

    /// The backing service could not be reached.
    #[error("word store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("word store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded.
    #[error("word store data is corrupt: {0}")]
    Corrupt(String),
}

/// Ways a quiz session can end without a summary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Input stopped before every question was answered.
    #[error("session abandoned after {answered} of {total} questions")]
    Abandoned { answered: usize, total: usize },

    /// The session task is gone and no longer accepts commands.
    #[error("session is closed")]
    Closed,

    /// The session task panicked or was cancelled.
    #[error("session task failed: {0}")]
    Aborted(String),
}
