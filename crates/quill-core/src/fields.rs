//! Field introspection.
//!
//! A [`FieldSet`] is the ordered list of column names a value binds. Structs
//! declare their fields statically through [`Record`] (normally via
//! `#[derive(Record)]` or `#[derive(Entity)]`); explicit [`ParamSet`] bags
//! report their own keys.
//!
//! Field sets derived from a record type are computed on first use and cached
//! for the lifetime of the process, keyed by [`TypeId`]. Two threads racing to
//! populate the same key compute identical values, so the first insert wins
//! and the second is discarded.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::params::ParamSet;
use crate::value::SqlValue;

/// Static description of one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name the field binds to.
    pub name: &'static str,
    /// Whether the field takes part in persistence.
    pub mapped: bool,
}

impl FieldDescriptor {
    /// Describes a persisted field.
    #[must_use]
    pub const fn mapped(name: &'static str) -> Self {
        Self { name, mapped: true }
    }

    /// Describes a field excluded from persistence.
    #[must_use]
    pub const fn skipped(name: &'static str) -> Self {
        Self {
            name,
            mapped: false,
        }
    }
}

/// A struct whose fields can be bound as statement parameters.
///
/// Implemented by `#[derive(Record)]` and `#[derive(Entity)]`.
pub trait Record: 'static {
    /// All fields in declaration order, including skipped ones.
    const FIELDS: &'static [FieldDescriptor];

    /// Returns the value of a mapped field by column name.
    fn field_value(&self, name: &str) -> Option<SqlValue>;
}

/// Ordered, duplicate-free list of field names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSet {
    names: Arc<[String]>,
}

impl FieldSet {
    /// Builds a field set from names, dropping later duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique.into(),
        }
    }

    /// Returns the cached field set of a record type.
    #[must_use]
    pub fn of<R: Record>() -> Self {
        let key = TypeId::of::<R>();
        if let Some(found) = cache()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return found.clone();
        }

        let computed = Self::new(
            R::FIELDS
                .iter()
                .filter(|field| field.mapped)
                .map(|field| field.name),
        );
        cache()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(computed)
            .clone()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Whether `name` is present (exact match).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Whether `name` is present, ignoring ASCII case.
    #[must_use]
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Returns a new set without the names matching `exclude`.
    #[must_use]
    pub fn without(&self, exclude: impl Fn(&str) -> bool) -> Self {
        Self {
            names: self
                .names
                .iter()
                .filter(|n| !exclude(n.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Returns the names as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

fn cache() -> &'static RwLock<HashMap<TypeId, FieldSet>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, FieldSet>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// A value that can be used as a filter, key or data bag for a statement.
///
/// Implemented for every [`Record`] and for [`ParamSet`].
pub trait Params {
    /// The ordered field names this value binds.
    fn fields(&self) -> FieldSet;

    /// The value bound to `name`, if any.
    fn value_of(&self, name: &str) -> Option<SqlValue>;

    /// Collects the named fields into a parameter set.
    ///
    /// Fields that report no value bind as NULL.
    fn param_set(&self, fields: &FieldSet) -> ParamSet {
        let mut set = ParamSet::with_capacity(fields.len());
        for name in fields {
            set.push_unique(name, self.value_of(name).unwrap_or(SqlValue::Null));
        }
        set
    }

    /// Collects every field into a parameter set.
    fn to_param_set(&self) -> ParamSet {
        self.param_set(&self.fields())
    }
}

impl<R: Record> Params for R {
    fn fields(&self) -> FieldSet {
        FieldSet::of::<R>()
    }

    fn value_of(&self, name: &str) -> Option<SqlValue> {
        self.field_value(name)
    }
}

/// Returns the bindable fields of a value.
pub fn fields_of<P: Params + ?Sized>(value: &P) -> FieldSet {
    value.fields()
}
