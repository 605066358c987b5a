//! SQL dialect support.
//!
//! Each supported database gets a unit-struct strategy implementing
//! [`Dialect`]. The strategies differ in identifier quoting, how the id of a
//! freshly inserted row is read back, how an upsert is spelled, and which
//! positional placeholder the driver expects.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use crate::error::{Error, Result};
use crate::fields::FieldSet;

/// Opening and closing identifier delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteStyle {
    /// Opening delimiter.
    pub open: char,
    /// Closing delimiter.
    pub close: char,
}

impl QuoteStyle {
    /// `"ident"`
    pub const DOUBLE: Self = Self {
        open: '"',
        close: '"',
    };
    /// `` `ident` ``
    pub const BACKTICK: Self = Self {
        open: '`',
        close: '`',
    };
    /// `[ident]`
    pub const BRACKET: Self = Self {
        open: '[',
        close: ']',
    };
}

/// Lexical rules that decide where quoted text ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Syntax {
    /// `[name]` is a quoted identifier rather than an array subscript.
    pub bracket_identifiers: bool,
    /// A backslash escapes the next character in string literals.
    pub backslash_escapes: bool,
}

impl Syntax {
    /// Quotes and comments only, as in standard SQL.
    pub const STANDARD: Self = Self {
        bracket_identifiers: false,
        backslash_escapes: false,
    };
}

/// Where the "read back the inserted id" fragment goes in an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdFragment {
    /// Appended after the VALUES list.
    Suffix(String),
    /// Placed between the column list and VALUES.
    BeforeValues(String),
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier delimiters.
    fn quote(&self) -> QuoteStyle {
        QuoteStyle::DOUBLE
    }

    /// Returns the lexical rules used when scanning SQL text.
    fn syntax(&self) -> Syntax {
        Syntax::STANDARD
    }

    /// Quotes an identifier, doubling any embedded closing delimiter.
    fn quote_identifier(&self, name: &str) -> String {
        let QuoteStyle { open, close } = self.quote();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(open);
        for c in name.chars() {
            if c == close {
                quoted.push(close);
            }
            quoted.push(c);
        }
        quoted.push(close);
        quoted
    }

    /// Returns the positional placeholder for the 1-based `index`.
    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    /// Returns the fragment that makes an INSERT yield the new key value.
    fn last_insert_id(&self, key: &str) -> IdFragment;

    /// Returns the conflict clause appended to an INSERT to make it an upsert.
    ///
    /// With a `key` the clause makes the statement yield that key; without
    /// one the statement only reports affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] if the dialect has no upsert
    /// form for the request.
    fn upsert_clause(&self, _key: Option<&str>, _update: &FieldSet) -> Result<String> {
        Err(Error::UnsupportedOperation {
            dialect: self.name(),
            operation: "upsert",
        })
    }

    /// Returns the row-window clause appended to a paged query.
    ///
    /// The clause references the `@limit` and `@offset` parameters.
    fn limit_offset_clause(&self) -> &'static str {
        "LIMIT @limit OFFSET @offset"
    }

    /// Returns whether a single-row read is spelled with a trailing `LIMIT 1`
    /// rather than `SELECT TOP 1`.
    fn supports_limit(&self) -> bool {
        true
    }
}

/// Renders `"c" = @c, ...` for every column in `columns`.
pub(crate) fn assignments(dialect: &dyn Dialect, columns: &FieldSet) -> String {
    columns
        .iter()
        .map(|c| format!("{} = @{c}", dialect.quote_identifier(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The closed set of supported dialects, as chosen in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// Microsoft SQL Server.
    SqlServer,
    /// SQLite.
    #[default]
    Sqlite,
}

impl DialectKind {
    /// All supported dialects.
    pub const ALL: [Self; 4] = [Self::MySql, Self::Postgres, Self::SqlServer, Self::Sqlite];

    /// Returns the strategy for this dialect.
    #[must_use]
    pub fn policy(self) -> &'static dyn Dialect {
        match self {
            Self::MySql => &MySqlDialect,
            Self::Postgres => &PostgresDialect,
            Self::SqlServer => &SqlServerDialect,
            Self::Sqlite => &SqliteDialect,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.policy().name())
    }
}

impl FromStr for DialectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.policy().name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid(format!("unknown dialect '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_doubles_close_delimiter() {
        let sqlserver = DialectKind::SqlServer.policy();
        assert_eq!(sqlserver.quote_identifier("a]b"), "[a]]b]");
        let mysql = DialectKind::MySql.policy();
        assert_eq!(mysql.quote_identifier("Menu"), "`Menu`");
    }

    #[test]
    fn test_quote_styles() {
        assert_eq!(DialectKind::MySql.policy().quote(), QuoteStyle::BACKTICK);
        assert_eq!(DialectKind::Postgres.policy().quote(), QuoteStyle::DOUBLE);
        assert_eq!(DialectKind::SqlServer.policy().quote(), QuoteStyle::BRACKET);
        assert_eq!(DialectKind::Sqlite.policy().quote(), QuoteStyle::DOUBLE);
    }

    #[test]
    fn test_syntax_per_dialect() {
        assert!(DialectKind::MySql.policy().syntax().backslash_escapes);
        assert!(!DialectKind::Postgres.policy().syntax().bracket_identifiers);
        assert!(DialectKind::SqlServer.policy().syntax().bracket_identifiers);
        assert!(DialectKind::Sqlite.policy().syntax().bracket_identifiers);
        assert_eq!(DialectKind::Postgres.policy().syntax(), Syntax::STANDARD);
    }

    #[test]
    fn test_dialect_kind_round_trips_through_names() {
        for kind in DialectKind::ALL {
            assert_eq!(kind.to_string().parse::<DialectKind>().unwrap(), kind);
        }
        assert!("oracle".parse::<DialectKind>().is_err());
    }

    #[test]
    fn test_dialect_kind_deserializes_lowercase() {
        let kind: DialectKind = serde_json::from_str("\"sqlserver\"").unwrap();
        assert_eq!(kind, DialectKind::SqlServer);
        let kind: DialectKind = serde_json::from_str("\"mysql\"").unwrap();
        assert_eq!(kind, DialectKind::MySql);
    }

    #[test]
    fn test_assignments() {
        let columns = FieldSet::new(["Url", "Name"]);
        assert_eq!(
            assignments(DialectKind::Postgres.policy(), &columns),
            "\"Url\" = @Url, \"Name\" = @Name"
        );
    }
}
