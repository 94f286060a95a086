//! Store Pool - one shared store instance per (entity type, backing file)
//!
//! Every consumer must observe the same cache; a second store over the same
//! file would silently desynchronize two in-memory views of one table. The
//! pool is an explicit registry constructed at process start and passed to
//! whatever needs stores, so tests can build their own over scratch files.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::Result;
use crate::entity::Entity;
use crate::store::{SecondaryIndex, Store};

type PoolKey = (TypeId, PathBuf);

/// Process-wide registry of store instances.
///
/// `get` constructs a store lazily on first use and returns the same `Arc`
/// for every later call with the same store type and path. Construction runs
/// under the registry lock, so it happens exactly once even under racing
/// first callers. Path identity is textual: callers are expected to route
/// paths through [`crate::config`] constants rather than recomputing them
/// per call site.
#[derive(Default)]
pub struct StorePool {
    stores: Mutex<HashMap<PoolKey, Arc<dyn Any + Send + Sync>>>,
}

impl StorePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared store for `(Store<T, X>, path)`, loading it on first use
    pub fn get<T, X>(&self, path: &Path) -> Result<Arc<Store<T, X>>>
    where
        T: Entity,
        X: SecondaryIndex<T>,
    {
        let key = (TypeId::of::<Store<T, X>>(), path.to_path_buf());
        let mut stores = self
            .stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = stores.get(&key) {
            if let Ok(store) = Arc::downcast::<Store<T, X>>(Arc::clone(existing)) {
                return Ok(store);
            }
        }

        tracing::info!("Constructing store for table {} at {}", T::TABLE, path.display());
        let store = Arc::new(Store::<T, X>::open(path)?);
        stores.insert(key, Arc::clone(&store) as Arc<dyn Any + Send + Sync>);
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity;
    use crate::entity::RowId;

    entity! {
        pub struct Bookmark {
            key id: RowId,
            url: String,
        }
    }

    #[test]
    fn test_same_instance_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.db");
        let pool = StorePool::new();

        let first: Arc<Store<Bookmark>> = pool.get(&path).unwrap();
        let second: Arc<Store<Bookmark>> = pool.get(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_paths_distinct_instances() {
        let dir = tempfile::tempdir().unwrap();
        let pool = StorePool::new();

        let a: Arc<Store<Bookmark>> = pool.get(&dir.path().join("a.db")).unwrap();
        let b: Arc<Store<Bookmark>> = pool.get(&dir.path().join("b.db")).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_mutations_visible_through_every_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.db");
        let pool = StorePool::new();

        let writer: Arc<Store<Bookmark>> = pool.get(&path).unwrap();
        let stored = writer
            .add(Bookmark {
                id: RowId::UNSET,
                url: "https://example.com".into(),
            })
            .unwrap();

        let reader: Arc<Store<Bookmark>> = pool.get(&path).unwrap();
        assert_eq!(reader.at(stored.id).unwrap().url, "https://example.com");
    }

    #[test]
    fn test_racing_first_callers_share_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.db");
        let pool = Arc::new(StorePool::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            let path = path.clone();
            handles.push(std::thread::spawn(move || {
                pool.get::<Bookmark, ()>(&path).unwrap()
            }));
        }

        let stores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for store in &stores[1..] {
            assert!(Arc::ptr_eq(&stores[0], store));
        }
    }
}
