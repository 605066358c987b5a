//! Error types for database operations.

use thiserror::Error;

/// Errors raised by [`Database`](crate::Database) and the executors.
#[derive(Debug, Error)]
pub enum Error {
    /// Statement synthesis or row mapping failed.
    #[error(transparent)]
    Core(#[from] quill_core::Error),

    /// Database error from sqlx, propagated unchanged.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// A statement expected to yield a value returned no rows.
    #[error("statement returned no rows")]
    EmptyResult,

    /// `begin` was called while a transaction is open.
    #[error("a transaction is already active")]
    TransactionAlreadyActive,

    /// `commit` or `rollback` was called with no open transaction.
    #[error("no active transaction")]
    NoActiveTransaction,
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_are_transparent() {
        let err: Error = quill_core::Error::MalformedQuery(String::from("no FROM")).into();
        assert_eq!(err.to_string(), "malformed query: no FROM");
        assert!(matches!(
            err,
            Error::Core(quill_core::Error::MalformedQuery(_))
        ));
    }

    #[test]
    fn test_transaction_messages() {
        assert_eq!(
            Error::TransactionAlreadyActive.to_string(),
            "a transaction is already active"
        );
        assert_eq!(Error::NoActiveTransaction.to_string(), "no active transaction");
    }
}
