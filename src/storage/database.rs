//! SQL execution layer - one connection per backing file

use std::path::Path;

use rusqlite::{Connection, params_from_iter};

use super::sql;
use crate::Result;
use crate::entity::{Entity, RowId, Value};

/// Owns one SQLite connection and executes the generic entity statements.
///
/// Callers never hand-write SQL; every statement comes out of
/// [`crate::storage::sql`] from the entity's column descriptors. Any engine
/// failure surfaces as [`crate::Error::Storage`] carrying the SQLite
/// diagnostic, never silently.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the table for `T` if absent. Safe to call on every open.
    pub fn create_table<T: Entity>(&self) -> Result<()> {
        self.conn.execute(&sql::create_table::<T>(), [])?;
        Ok(())
    }

    /// Insert all non-key columns of `entity` and return the engine-assigned
    /// key. The entity's own key field is ignored.
    pub fn insert<T: Entity>(&self, entity: &T) -> Result<RowId> {
        let values = entity.values()?;
        self.conn.execute(
            &sql::insert::<T>(),
            params_from_iter(Self::non_key_values::<T>(values)),
        )?;
        Ok(RowId::new(self.conn.last_insert_rowid()))
    }

    /// Read every row of `T`'s table, decoding each column back into its
    /// field type. Called once per store lifetime, at construction.
    pub fn select_all<T: Entity>(&self) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(&sql::select_all::<T>())?;
        let width = T::COLUMNS.len();

        let rows = stmt.query_map([], |row| {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(row.get::<_, Value>(i)?);
            }
            Ok(values)
        })?;

        let mut entities = Vec::new();
        for values in rows {
            entities.push(T::from_values(values?)?);
        }
        Ok(entities)
    }

    /// Update all non-key columns of the row whose key matches the entity's.
    /// Returns the number of rows actually changed, so callers can detect a
    /// no-op update (key not found).
    pub fn update_by_key<T: Entity>(&self, entity: &T) -> Result<usize> {
        let values = entity.values()?;
        let key = entity.key();
        let params = Self::non_key_values::<T>(values)
            .chain(std::iter::once(Value::Integer(key.value())));
        let changed = self
            .conn
            .execute(&sql::update_by_key::<T>(), params_from_iter(params))?;
        Ok(changed)
    }

    /// Delete the row with the given key. Deleting an absent key is not an
    /// error; the engine reports zero changed rows and we move on.
    pub fn delete_by_key<T: Entity>(&self, id: RowId) -> Result<()> {
        self.conn
            .execute(&sql::delete_by_key::<T>(), [id.value()])?;
        Ok(())
    }

    fn non_key_values<T: Entity>(values: Vec<Value>) -> impl Iterator<Item = Value> {
        values
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != T::KEY_INDEX)
            .map(|(_, v)| v)
    }
}
