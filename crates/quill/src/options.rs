//! Database configuration.

use quill_core::DialectKind;
use serde::Deserialize;

/// Settings chosen once per [`Database`](crate::Database).
///
/// Deserializes from configuration with every field optional:
///
/// ```rust
/// use quill::{DialectKind, Options};
///
/// let options: Options = serde_json::from_str(r#"{ "dialect": "mysql" }"#).unwrap();
/// assert_eq!(options.dialect, DialectKind::MySql);
/// assert!(!options.lower_case_table_names);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Dialect used to synthesize statements.
    pub dialect: DialectKind,
    /// Lower-case resolved table names.
    pub lower_case_table_names: bool,
}

impl Options {
    /// Creates options with the given dialect.
    #[must_use]
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Sets the dialect.
    #[must_use]
    pub const fn dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets whether table names are lower-cased.
    #[must_use]
    pub const fn lower_case_table_names(mut self, lower_case: bool) -> Self {
        self.lower_case_table_names = lower_case;
        self
    }
}
