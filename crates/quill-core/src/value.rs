//! SQL values and conversions.
//!
//! Values always travel as bound parameters; statement text only ever
//! carries `@name` placeholders.

use serde::Serialize;

/// A SQL value that can be bound to a parameter or read from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns whether this is SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as an integer, if it holds one.
    ///
    /// Integral text (as returned by some drivers for `BIGINT` results) is
    /// parsed as well.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// Trait for types that can be read back from SQL values.
///
/// Returns `None` when the value's shape does not fit the type; the row
/// mapper turns that into [`crate::Error::TypeMismatch`].
pub trait FromSqlValue: Sized {
    /// Converts a `SqlValue` into `Self`.
    fn from_sql_value(value: SqlValue) -> Option<Self>;
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        Some(value)
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        value.as_i64()
    }
}

macro_rules! impl_from_sql_int {
    ($($ty:ty),+) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: SqlValue) -> Option<Self> {
                    value.as_i64().and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )+
    };
}

impl_from_sql_int!(i32, i16, i8, u64, u32, u16, u8);

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(b),
            SqlValue::Int(n) => Some(n != 0),
            _ => None,
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(f) => Some(f),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => Some(n as f64),
            _ => None,
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        match value {
            SqlValue::Blob(b) => Some(b),
            SqlValue::Text(s) => Some(s.into_bytes()),
            _ => None,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}
