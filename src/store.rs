//! Write-through cache - the in-memory store
//!
//! A [`Store`] fully materializes one table at construction and serves every
//! read from an ordered in-memory map afterwards. Mutations go backing store
//! first, map second, under one exclusive lock window, so a reader can never
//! observe a map entry whose row is not on disk yet, and two mutations can
//! never interleave their SQL call with each other's map update.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entity::{Entity, RowId};
use crate::storage::Database;
use crate::{Error, Result};

/// An auxiliary index over a non-key field, kept consistent with the primary
/// map inside the store's own exclusive lock window.
///
/// `insert` and `remove` are called with the row entering or leaving the map;
/// an update is a `remove` of the old row followed by an `insert` of the new
/// one, so an index over a changed field migrates in one critical section.
///
/// Uniqueness is not enforced here: if two rows carry the same indexed value
/// the index is last-writer-wins while the primary map keeps both rows.
/// Callers that need uniqueness pre-check under [`Store::with_read`].
pub trait SecondaryIndex<T>: Default + Send + Sync + 'static {
    fn insert(&mut self, row: &T);
    fn remove(&mut self, row: &T);
}

/// The index-less store
impl<T> SecondaryIndex<T> for () {
    fn insert(&mut self, _row: &T) {}
    fn remove(&mut self, _row: &T) {}
}

struct Inner<T, X> {
    rows: BTreeMap<RowId, T>,
    index: X,
}

/// Thread-safe write-through cache for one entity type over one backing file.
///
/// Reads (`at`, `with_read`) take the lock shared and never touch the
/// backing store; mutations (`add`, `update`, `del`) take it exclusive for
/// the entire operation, backing-store call included. `at` returns an owned
/// clone, so no reference into the map outlives the lock.
pub struct Store<T: Entity, X: SecondaryIndex<T> = ()> {
    // The RwLock write guard is what serializes mutations; the Mutex only
    // exists because rusqlite::Connection is not Sync.
    db: Mutex<Database>,
    inner: RwLock<Inner<T, X>>,
}

impl<T: Entity, X: SecondaryIndex<T>> Store<T, X> {
    /// Open the backing file, create the schema if absent, and load every
    /// row. Either the fully populated store comes back or an error does;
    /// no partial store is ever observable.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_database(Database::open(path)?)
    }

    /// In-memory backing store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_database(Database::open_in_memory()?)
    }

    /// Build the store over an already opened database handle. The handle is
    /// owned exclusively from here on.
    pub fn from_database(db: Database) -> Result<Self> {
        db.create_table::<T>()?;
        let loaded = db.select_all::<T>()?;

        let mut rows = BTreeMap::new();
        let mut index = X::default();
        for row in loaded {
            index.insert(&row);
            rows.insert(row.key(), row);
        }
        tracing::debug!("Loaded {} rows from table {}", rows.len(), T::TABLE);

        Ok(Self {
            db: Mutex::new(db),
            inner: RwLock::new(Inner { rows, index }),
        })
    }

    /// Look up an entity by key. Never touches the backing store; absence is
    /// an error, not a null result.
    pub fn at(&self, id: RowId) -> Result<T> {
        self.read()
            .rows
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { table: T::TABLE, id })
    }

    /// Insert a new entity. The backing store assigns the key, which is
    /// written into the returned copy before it enters the map. On insert
    /// failure the map is untouched.
    pub fn add(&self, mut entity: T) -> Result<T> {
        let mut inner = self.write();
        let id = self.db().insert(&entity)?;
        entity.set_key(id);
        inner.index.insert(&entity);
        inner.rows.insert(id, entity.clone());
        Ok(entity)
    }

    /// Update the row matching the entity's key, overwriting the map entry
    /// unconditionally. The entity must already carry a valid key.
    pub fn update(&self, entity: T) -> Result<T> {
        self.update_inner(entity, false)
    }

    /// Like [`Store::update`], but fails with `NotFound` before touching the
    /// map when the backing store changed zero rows.
    pub fn update_strict(&self, entity: T) -> Result<T> {
        self.update_inner(entity, true)
    }

    fn update_inner(&self, entity: T, must_exist: bool) -> Result<T> {
        let id = entity.key();
        if !id.is_set() {
            return Err(Error::NotFound { table: T::TABLE, id });
        }

        let mut inner = self.write();
        let changed = self.db().update_by_key(&entity)?;
        if must_exist && changed == 0 {
            return Err(Error::NotFound { table: T::TABLE, id });
        }

        if let Some(old) = inner.rows.get(&id).cloned() {
            inner.index.remove(&old);
        }
        inner.index.insert(&entity);
        inner.rows.insert(id, entity.clone());
        Ok(entity)
    }

    /// Delete by key. Idempotent: deleting an absent key succeeds and leaves
    /// the map without that key either way.
    pub fn del(&self, id: RowId) -> Result<()> {
        let mut inner = self.write();
        self.db().delete_by_key::<T>(id)?;
        if let Some(old) = inner.rows.remove(&id) {
            inner.index.remove(&old);
        }
        Ok(())
    }

    /// Run a read-only closure over the raw map and index under the shared
    /// lock. This is how index-backed stores expose their lookups.
    pub fn with_read<R>(&self, f: impl FnOnce(&BTreeMap<RowId, T>, &X) -> R) -> R {
        let inner = self.read();
        f(&inner.rows, &inner.index)
    }

    /// Run a read-write closure over the raw map and index under the
    /// exclusive lock. Changes made here bypass the backing store; the
    /// caller owns keeping the two consistent.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut BTreeMap<RowId, T>, &mut X) -> R) -> R {
        let mut inner = self.write();
        let Inner { rows, index } = &mut *inner;
        f(rows, index)
    }

    /// Number of cached rows
    pub fn len(&self) -> usize {
        self.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().rows.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<T, X>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<T, X>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
