//! Error taxonomy shared by every component of the pipeline.
//!
//! The five kinds named here (`Connection`, `Query`, `Validation`, `Parse`,
//! `Dispatch`) are exactly the ones the error-handling design distinguishes;
//! callers match on them to decide whether to log-and-continue, surface a
//! 400, or propagate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure talking to the store or an external API.
    #[error("connection error: {0}")]
    Connection(String),

    /// SQL execution or constraint failure that is not an expected duplicate.
    #[error("query error: {0}")]
    Query(String),

    /// Client-supplied input failed validation; maps to HTTP 400.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed XML or unparseable search response; the caller skips the item.
    #[error("parse error: {0}")]
    Parse(String),

    /// Producer-to-consumer dispatch failed (connection, non-2xx, or timeout).
    #[error("dispatch error: {0}")]
    Dispatch(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Error::Connection(err.to_string())
            }
            _ => Error::Query(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Connection(err.to_string())
    }
}

/// True when a Postgres error is a unique-violation (SQLSTATE `23505`).
///
/// Consumer register, Metadata dedup, and Result `(pmcid, job_id)` conflicts
/// are expected and must be swallowed rather than propagated; everything
/// else is a real constraint failure.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().and_then(|e| e.code()),
        Some(code) if code == "23505"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_are_stable() {
        assert_eq!(
            Error::Validation("id is required".into()).to_string(),
            "validation error: id is required"
        );
        assert_eq!(
            Error::Dispatch("timeout".into()).to_string(),
            "dispatch error: timeout"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
