//! Result rows and typed row mapping.

use crate::error::{Error, Result};
use crate::value::{FromSqlValue, SqlValue};

/// One result row: column names with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates a row from `(column, value)` pairs.
    #[must_use]
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over the columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the raw value of a column.
    ///
    /// Looks for an exact name first, then an ASCII case-insensitive one.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
            })
            .map(|(_, v)| v)
    }

    /// Reads a column as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if there is no such column and
    /// [`Error::TypeMismatch`] if its value does not convert.
    pub fn get<T: FromSqlValue>(&self, name: &str) -> Result<T> {
        let value = self
            .value(name)
            .ok_or_else(|| Error::MissingColumn(String::from(name)))?;
        T::from_sql_value(value.clone()).ok_or_else(|| Error::TypeMismatch {
            column: String::from(name),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Returns the value of the first column.
    #[must_use]
    pub fn first(&self) -> Option<&SqlValue> {
        self.columns.first().map(|(_, v)| v)
    }

    /// Splits a joined row in two at the last column named `split_on`.
    ///
    /// The split column starts the right-hand row. Matching is ASCII
    /// case-insensitive and ignores the first column, so a row whose only
    /// `split_on` column is its first one cannot be split.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] when no split point exists.
    pub fn split(&self, split_on: &str) -> Result<(Self, Self)> {
        let at = self
            .columns
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, (n, _))| n.eq_ignore_ascii_case(split_on))
            .map(|(i, _)| i)
            .ok_or_else(|| Error::MissingColumn(String::from(split_on)))?;
        let (left, right) = self.columns.split_at(at);
        Ok((Self::new(left.to_vec()), Self::new(right.to_vec())))
    }
}

/// Types that can be built from a result row.
///
/// Implemented by `#[derive(Entity)]`.
pub trait FromRow: Sized {
    /// Maps one row.
    ///
    /// # Errors
    ///
    /// Returns an error if a needed column is missing or has the wrong type.
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined() -> Row {
        Row::new(vec![
            (String::from("Id"), SqlValue::Int(1)),
            (String::from("Title"), SqlValue::Text(String::from("post"))),
            (String::from("id"), SqlValue::Int(7)),
            (String::from("Name"), SqlValue::Text(String::from("ann"))),
        ])
    }

    #[test]
    fn test_get_typed() {
        let row = joined();
        assert_eq!(row.get::<i64>("Id").unwrap(), 1);
        assert_eq!(row.get::<String>("title").unwrap(), "post");
        assert_eq!(row.get::<Option<String>>("Name").unwrap().as_deref(), Some("ann"));
        assert_eq!(row.first(), Some(&SqlValue::Int(1)));
        assert_eq!(Row::default().first(), None);
    }

    #[test]
    fn test_get_errors() {
        let row = joined();
        assert!(matches!(row.get::<i64>("Missing"), Err(Error::MissingColumn(_))));
        assert!(matches!(
            row.get::<i64>("Title"),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_split_on_last_matching_column() {
        let (left, right) = joined().split("Id").unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(right.get::<i64>("id").unwrap(), 7);
        assert_eq!(right.get::<String>("Name").unwrap(), "ann");
    }

    #[test]
    fn test_split_requires_column_after_first() {
        let row = Row::new(vec![
            (String::from("Id"), SqlValue::Int(1)),
            (String::from("Name"), SqlValue::Null),
        ]);
        assert!(matches!(row.split("Id"), Err(Error::MissingColumn(_))));
    }
}
