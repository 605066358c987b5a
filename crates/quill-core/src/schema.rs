//! Entity metadata.

use crate::fields::{FieldSet, Record};
use crate::row::FromRow;
use crate::PRIMARY_KEY_CONVENTION;

/// Static description of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMeta {
    /// Rust type name.
    pub type_name: &'static str,
    /// Declared table name.
    pub table: &'static str,
    /// Primary-key column.
    pub primary_key: &'static str,
}

impl EntityMeta {
    /// Describes an entity with the conventional `Id` key.
    #[must_use]
    pub const fn new(type_name: &'static str, table: &'static str) -> Self {
        Self {
            type_name,
            table,
            primary_key: PRIMARY_KEY_CONVENTION,
        }
    }

    /// Overrides the primary-key column.
    #[must_use]
    pub const fn with_primary_key(mut self, primary_key: &'static str) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Whether `column` is the primary key (ASCII case-insensitive).
    #[must_use]
    pub fn is_primary_key(&self, column: &str) -> bool {
        column.eq_ignore_ascii_case(self.primary_key)
    }
}

/// A record stored in its own table.
///
/// Implemented by `#[derive(Entity)]`.
pub trait Entity: Record + FromRow {
    /// Entity metadata.
    const META: EntityMeta;

    /// The persisted columns of this entity.
    #[must_use]
    fn columns() -> FieldSet {
        FieldSet::of::<Self>()
    }
}
