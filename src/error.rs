//! Error types for the chained hash map and its word-stream helpers.
//!
//! Contract violations (a zero capacity, shrinking through `resize`) are
//! assertions and panic; everything a caller can reasonably recover from
//! is a [`ChainError`].

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    /// A fallible reservation for an entry or a grown bucket array failed.
    /// The table is unchanged.
    #[error("Allocation failed: could not reserve {requested} slots")]
    AllocationFailed { requested: usize },

    /// Reading a word stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A query held something other than ASCII letters.
    #[error("Invalid query: {0:?}")]
    InvalidQuery(String),

    /// The timing harness could not run.
    #[error("Benchmark error: {0}")]
    Benchmark(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;

impl ChainError {
    pub fn allocation_failed(requested: usize) -> Self {
        ChainError::AllocationFailed { requested }
    }

    pub fn invalid_query<S: Into<String>>(query: S) -> Self {
        ChainError::InvalidQuery(query.into())
    }

    pub fn benchmark<S: Into<String>>(msg: S) -> Self {
        ChainError::Benchmark(msg.into())
    }
}
