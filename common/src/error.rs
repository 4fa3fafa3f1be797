//! Errors raised while loading input shards.
//!
//! Only the loader can fail. Counting, shuffling, reducing and ranking are
//! total over a validated key sequence.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Error, Debug)]
pub enum LoadError {
    /// The input path does not exist, or the glob spec matched nothing.
    #[error("input not found: {0}")]
    NotFound(String),

    /// A record is empty or its key field is missing or blank.
    #[error("invalid record in {} at line {line}: {reason}", shard.display())]
    Validation {
        shard: PathBuf,
        line: u64,
        reason: InvalidRecord,
    },

    /// The glob spec could not be parsed.
    #[error("invalid input pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LoadError {
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Why a record was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRecord {
    #[error("record is empty")]
    Empty,

    #[error("record has no key field")]
    MissingKey,

    #[error("key field is blank")]
    BlankKey,
}
