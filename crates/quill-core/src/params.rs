//! Ordered parameter sets and named placeholder binding.
//!
//! Statements are always written with `@name` placeholders. Right before
//! execution [`bind_named`] rewrites them into the positional form the target
//! dialect expects and produces the matching value list.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::fields::{FieldSet, Params};
use crate::scan::{is_word_byte, skip_opaque};
use crate::value::{SqlValue, ToSqlValue};

/// An ordered name to value association.
///
/// Adding a name that is already present is an error; a set never silently
/// overwrites a binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: Vec<(String, SqlValue)>,
}

impl ParamSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates an empty parameter set with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Adds a binding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is already bound.
    pub fn add(&mut self, name: impl Into<String>, value: impl ToSqlValue) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(Error::invalid(format!("parameter '{name}' is already bound")));
        }
        self.entries.push((name, value.to_sql_value()));
        Ok(())
    }

    /// Builder-style [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is already bound.
    pub fn with(mut self, name: impl Into<String>, value: impl ToSqlValue) -> Result<Self> {
        self.add(name, value)?;
        Ok(self)
    }

    /// Appends every binding of `other`, keeping order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] on the first name present in both.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        for (name, value) in &other.entries {
            self.add(name.clone(), value.clone())?;
        }
        Ok(())
    }

    /// Adds a binding unless the name is already present.
    pub(crate) fn push_unique(&mut self, name: &str, value: SqlValue) {
        if !self.contains(name) {
            self.entries.push((String::from(name), value));
        }
    }

    /// Returns the value bound to `name` (exact match).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns the value bound to `name`, falling back to an ASCII
    /// case-insensitive match.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&SqlValue> {
        self.get(name).or_else(|| {
            self.entries
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    /// Whether `name` is bound (exact match).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Params for ParamSet {
    fn fields(&self) -> FieldSet {
        FieldSet::new(self.entries.iter().map(|(n, _)| n.as_str()))
    }

    fn value_of(&self, name: &str) -> Option<SqlValue> {
        self.get(name).cloned()
    }
}

/// Rewrites `@name` placeholders into `dialect` placeholders.
///
/// Returns the rewritten text and the values in placeholder order. A name
/// used twice is bound twice. Placeholders inside string literals, quoted
/// identifiers and comments are left alone, as are `@@` system variables.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when a placeholder has no binding.
pub fn bind_named(
    sql: &str,
    params: &ParamSet,
    dialect: &dyn Dialect,
) -> Result<(String, Vec<SqlValue>)> {
    let bytes = sql.as_bytes();
    let syntax = dialect.syntax();
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(next) = skip_opaque(bytes, i, syntax) {
            i = next;
            continue;
        }
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }
        if i + 1 < bytes.len() && bytes[i + 1] == b'@' {
            i += 2;
            while i < bytes.len() && is_word_byte(bytes[i]) {
                i += 1;
            }
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        if end == start || bytes[start].is_ascii_digit() {
            i += 1;
            continue;
        }

        let name = &sql[start..end];
        let value = params
            .lookup(name)
            .ok_or_else(|| Error::invalid(format!("no value bound for parameter '@{name}'")))?;
        out.push_str(&sql[last..i]);
        values.push(value.clone());
        out.push_str(&dialect.placeholder(values.len()));
        last = end;
        i = end;
    }

    out.push_str(&sql[last..]);
    Ok((out, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    fn params() -> ParamSet {
        ParamSet::new()
            .with("Id", 1_i64)
            .and_then(|p| p.with("Url", "/x"))
            .unwrap()
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut set = params();
        let err = set.add("Id", 2_i64).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(set.get("Id"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn test_merge_keeps_order_and_rejects_collisions() {
        let mut data = ParamSet::new().with("Url", "/y").unwrap();
        let filter = ParamSet::new().with("Id", 5_i64).unwrap();
        data.merge(&filter).unwrap();
        let names: Vec<&str> = data.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Url", "Id"]);
        assert!(data.merge(&filter).is_err());
    }

    #[test]
    fn test_param_set_fields_are_verbatim() {
        let set = ParamSet::new()
            .with("b", 1_i64)
            .and_then(|p| p.with("a", 2_i64))
            .unwrap();
        assert_eq!(set.fields().as_slice(), &["b", "a"]);
    }

    #[test]
    fn test_bind_named_sqlite() {
        let (sql, values) = bind_named(
            "UPDATE t SET Url = @Url WHERE Id = @Id",
            &params(),
            DialectKind::Sqlite.policy(),
        )
        .unwrap();
        assert_eq!(sql, "UPDATE t SET Url = ? WHERE Id = ?");
        assert_eq!(
            values,
            vec![SqlValue::Text(String::from("/x")), SqlValue::Int(1)]
        );
    }

    #[test]
    fn test_bind_named_postgres_numbers_each_use() {
        let (sql, values) = bind_named(
            "SELECT * FROM t WHERE a = @Id OR b = @Id",
            &params(),
            DialectKind::Postgres.policy(),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 OR b = $2");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_bind_named_skips_literals_and_system_variables() {
        let (sql, values) = bind_named(
            "SELECT '@Id', @@ROWCOUNT, [@Url] FROM t WHERE x = @id -- @Nope",
            &params(),
            DialectKind::SqlServer.policy(),
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT '@Id', @@ROWCOUNT, [@Url] FROM t WHERE x = @P1 -- @Nope"
        );
        assert_eq!(values, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_bind_named_postgres_array_elements() {
        let (sql, values) = bind_named(
            "SELECT * FROM t WHERE id = ANY(ARRAY[@Id, @Url])",
            &params(),
            DialectKind::Postgres.policy(),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE id = ANY(ARRAY[$1, $2])");
        assert_eq!(
            values,
            vec![SqlValue::Int(1), SqlValue::Text(String::from("/x"))]
        );
    }

    #[test]
    fn test_bind_named_mysql_backslash_literal() {
        let (sql, values) = bind_named(
            r"SELECT * FROM t WHERE a = 'it\'s @Url' AND b = @Id",
            &params(),
            DialectKind::MySql.policy(),
        )
        .unwrap();
        assert_eq!(sql, r"SELECT * FROM t WHERE a = 'it\'s @Url' AND b = ?");
        assert_eq!(values, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_bind_named_missing_parameter() {
        let err = bind_named("SELECT @missing", &params(), DialectKind::MySql.policy())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
