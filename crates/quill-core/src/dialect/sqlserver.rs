//! SQL Server dialect implementation.

use super::{Dialect, IdFragment, QuoteStyle, Syntax};

/// SQL Server dialect.
///
/// Has no upsert form; `MERGE` needs a source table and is left to callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote(&self) -> QuoteStyle {
        QuoteStyle::BRACKET
    }

    fn syntax(&self) -> Syntax {
        Syntax {
            bracket_identifiers: true,
            backslash_escapes: false,
        }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@P{index}")
    }

    fn last_insert_id(&self, key: &str) -> IdFragment {
        IdFragment::BeforeValues(format!("OUTPUT INSERTED.{}", self.quote_identifier(key)))
    }

    // OFFSET/FETCH is only valid after an ORDER BY.
    fn limit_offset_clause(&self) -> &'static str {
        "OFFSET @offset ROWS FETCH NEXT @limit ROWS ONLY"
    }

    fn supports_limit(&self) -> bool {
        false
    }
}
