//! Error types for statement synthesis.

/// Errors raised while building or rewriting statements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A caller-supplied argument cannot produce a meaningful statement.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller SQL is outside the single-SELECT subset the pager understands.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// The dialect has no strategy for the requested operation.
    #[error("{operation} is not supported by the {dialect} dialect")]
    UnsupportedOperation {
        /// Dialect name.
        dialect: &'static str,
        /// Operation that was requested.
        operation: &'static str,
    },

    /// A column value could not be converted to the requested Rust type.
    #[error("column '{column}' cannot be read as {expected}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Rust type that was requested.
        expected: &'static str,
    },

    /// A row does not carry a column the mapping needs.
    #[error("column '{0}' not found in row")]
    MissingColumn(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQuery(message.into())
    }
}

/// Result type alias for statement synthesis.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operation_message() {
        let err = Error::UnsupportedOperation {
            dialect: "sqlserver",
            operation: "upsert",
        };
        assert_eq!(
            err.to_string(),
            "upsert is not supported by the sqlserver dialect"
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::TypeMismatch {
            column: String::from("Url"),
            expected: "i64",
        };
        assert!(err.to_string().contains("'Url'"));
        assert!(err.to_string().contains("i64"));
    }
}
