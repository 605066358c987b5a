//! MySQL dialect implementation.

use super::{assignments, Dialect, IdFragment, QuoteStyle, Syntax};
use crate::error::{Error, Result};
use crate::fields::FieldSet;

const SELECT_LAST_ID: &str = "; SELECT LAST_INSERT_ID()";

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self) -> QuoteStyle {
        QuoteStyle::BACKTICK
    }

    fn syntax(&self) -> Syntax {
        Syntax {
            bracket_identifiers: false,
            backslash_escapes: true,
        }
    }

    fn last_insert_id(&self, _key: &str) -> IdFragment {
        IdFragment::Suffix(String::from(SELECT_LAST_ID))
    }

    fn upsert_clause(&self, key: Option<&str>, update: &FieldSet) -> Result<String> {
        let set = assignments(self, update);
        match key {
            // LAST_INSERT_ID(expr) makes the trailing select return the
            // existing key when the row was updated instead of inserted.
            Some(key) => {
                let key = self.quote_identifier(key);
                let mut clause = format!("ON DUPLICATE KEY UPDATE {key} = LAST_INSERT_ID({key})");
                if !set.is_empty() {
                    clause.push_str(", ");
                    clause.push_str(&set);
                }
                clause.push_str(SELECT_LAST_ID);
                Ok(clause)
            }
            None if set.is_empty() => Err(Error::invalid("upsert requires at least one column")),
            None => Ok(format!("ON DUPLICATE KEY UPDATE {set}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_dialect() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.quote_identifier("Menu"), "`Menu`");
        assert_eq!(dialect.placeholder(3), "?");
        assert!(dialect.supports_limit());
        assert_eq!(
            dialect.last_insert_id("Id"),
            IdFragment::Suffix(String::from("; SELECT LAST_INSERT_ID()"))
        );
    }

    #[test]
    fn test_mysql_upsert_with_key() {
        let clause = MySqlDialect
            .upsert_clause(Some("Id"), &FieldSet::new(["Url"]))
            .unwrap();
        assert_eq!(
            clause,
            "ON DUPLICATE KEY UPDATE `Id` = LAST_INSERT_ID(`Id`), `Url` = @Url; SELECT LAST_INSERT_ID()"
        );
    }

    #[test]
    fn test_mysql_upsert_without_key() {
        let clause = MySqlDialect
            .upsert_clause(None, &FieldSet::new(["Url", "Name"]))
            .unwrap();
        assert_eq!(clause, "ON DUPLICATE KEY UPDATE `Url` = @Url, `Name` = @Name");
        assert!(MySqlDialect.upsert_clause(None, &FieldSet::default()).is_err());
    }
}
