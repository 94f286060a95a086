//! # Rowcache - Write-through in-memory entity cache over SQLite
//!
//! Rowcache loads a whole SQLite table into an ordered in-memory map at
//! startup and serves every read from memory afterwards. Mutations are
//! written through to the backing file before the map changes, under a
//! single reader/writer lock per store.
//!
//! Rowcache provides:
//! - Schema derivation from an entity's field list (`entity!` macro)
//! - A generic SQL execution layer (create / insert / select-all / update / delete)
//! - `Store<T, X>`: the thread-safe write-through cache with an optional
//!   secondary index maintained in the same critical section
//! - `StorePool`: one shared store instance per (entity type, database file)
//! - Worked entity types (`User`, `Track`, `Playlist`) with unique-name and
//!   path-presence indexes

pub mod codec;
pub mod config;
pub mod entity;
pub mod model;
pub mod pool;
pub mod storage;
pub mod store;

// Re-exports for convenient access
pub use codec::TextCodec;
pub use entity::{Column, Entity, FieldKind, FieldType, RowId};
pub use model::{Permission, Playlist, PlaylistStore, Track, TrackStore, User, UserStore};
pub use pool::StorePool;
pub use storage::Database;
pub use store::{SecondaryIndex, Store};

/// Result type alias for Rowcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Rowcache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("row {id} not found in {table}")]
    NotFound { table: &'static str, id: RowId },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
