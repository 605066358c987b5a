//! Table-name resolution.
//!
//! Names are resolved once per entity type and cached for the life of the
//! [`Database`](crate::Database). Racing resolutions of the same type
//! compute the same name, so the first insert wins.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use quill_core::{Entity, EntityMeta};
use tracing::trace;

/// Maps an entity to its physical table name.
pub trait TableNameResolver: Send + Sync {
    /// Returns the table name for `meta`.
    fn resolve(&self, meta: &EntityMeta) -> String;
}

/// Uses the table name declared on the entity.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredTableNames;

impl TableNameResolver for DeclaredTableNames {
    fn resolve(&self, meta: &EntityMeta) -> String {
        String::from(meta.table)
    }
}

pub(crate) struct TableNames {
    resolver: Box<dyn TableNameResolver>,
    lower_case: bool,
    cache: RwLock<HashMap<TypeId, Arc<str>>>,
}

impl TableNames {
    pub(crate) fn new(resolver: Box<dyn TableNameResolver>, lower_case: bool) -> Self {
        Self {
            resolver,
            lower_case,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn get<E: Entity>(&self) -> Arc<str> {
        let key = TypeId::of::<E>();
        if let Some(name) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(name);
        }

        let mut name = self.resolver.resolve(&E::META);
        if self.lower_case {
            name = name.to_lowercase();
        }
        trace!(entity = E::META.type_name, table = %name, "Resolved table name");
        Arc::clone(
            self.cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key)
                .or_insert_with(|| Arc::from(name)),
        )
    }
}

impl std::fmt::Debug for TableNames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableNames")
            .field("lower_case", &self.lower_case)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_derive::Entity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Entity)]
    #[entity(table = "MenuItem")]
    struct MenuItem {
        #[field(name = "Id")]
        id: i64,
    }

    #[derive(Entity)]
    #[entity(table = "Setting")]
    struct Setting {
        #[field(name = "Key", primary_key)]
        key: String,
    }

    struct Counting(Arc<AtomicUsize>);

    impl TableNameResolver for Counting {
        fn resolve(&self, meta: &EntityMeta) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            format!("App{}", meta.table)
        }
    }

    fn tables(lower_case: bool) -> (TableNames, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let names = TableNames::new(Box::new(Counting(Arc::clone(&calls))), lower_case);
        (names, calls)
    }

    #[test]
    fn test_resolves_once_per_entity() {
        let (names, calls) = tables(false);

        for _ in 0..3 {
            assert_eq!(&*names.get::<MenuItem>(), "AppMenuItem");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(&*names.get::<Setting>(), "AppSetting");
        assert_eq!(&*names.get::<Setting>(), "AppSetting");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lower_cased_name_is_cached() {
        let (names, calls) = tables(true);

        let first = names.get::<MenuItem>();
        let second = names.get::<MenuItem>();
        assert_eq!(&*first, "appmenuitem");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_declared_names() {
        let names = TableNames::new(Box::new(DeclaredTableNames), false);
        assert_eq!(&*names.get::<MenuItem>(), "MenuItem");
        assert_eq!(&*names.get::<Setting>(), "Setting");
    }
}
