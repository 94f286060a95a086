//! Storage Layer - SQLite-backed persistence
//!
//! One [`Database`] per backing file, four generic operations per entity
//! type (insert, select-all, update-by-key, delete-by-key) plus idempotent
//! table creation. Every statement is synthesized from the entity's column
//! descriptors in [`sql`]; nothing is hand-written per entity.

pub mod database;
pub mod sql;

pub use database::Database;
