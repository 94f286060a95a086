//! SQL statement synthesis from entity column descriptors

use crate::entity::Entity;

/// CREATE TABLE IF NOT EXISTS statement for `T`.
///
/// The key column is declared `INTEGER PRIMARY KEY`, the SQLite rowid alias,
/// so the engine assigns keys on insert.
pub fn create_table<T: Entity>() -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", T::TABLE);
    for (i, col) in T::COLUMNS.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(col.name);
        sql.push(' ');
        if i == T::KEY_INDEX {
            sql.push_str("INTEGER PRIMARY KEY");
        } else {
            sql.push_str(col.kind.sql_type());
        }
    }
    sql.push(')');
    sql
}

/// INSERT statement binding every non-key column
pub fn insert<T: Entity>() -> String {
    let mut names = String::new();
    let mut marks = String::new();
    for (i, col) in T::COLUMNS.iter().enumerate() {
        if i == T::KEY_INDEX {
            continue;
        }
        if !names.is_empty() {
            names.push_str(", ");
            marks.push_str(", ");
        }
        names.push_str(col.name);
        marks.push('?');
    }
    format!("INSERT INTO {} ({names}) VALUES ({marks})", T::TABLE)
}

/// SELECT of every row, columns in descriptor order
pub fn select_all<T: Entity>() -> String {
    let mut names = String::new();
    for (i, col) in T::COLUMNS.iter().enumerate() {
        if i > 0 {
            names.push_str(", ");
        }
        names.push_str(col.name);
    }
    format!("SELECT {names} FROM {}", T::TABLE)
}

/// UPDATE of every non-key column for the row matching the key
pub fn update_by_key<T: Entity>() -> String {
    let mut assignments = String::new();
    for (i, col) in T::COLUMNS.iter().enumerate() {
        if i == T::KEY_INDEX {
            continue;
        }
        if !assignments.is_empty() {
            assignments.push_str(", ");
        }
        assignments.push_str(col.name);
        assignments.push_str(" = ?");
    }
    format!(
        "UPDATE {} SET {assignments} WHERE {} = ?",
        T::TABLE,
        T::COLUMNS[T::KEY_INDEX].name
    )
}

/// DELETE of the row matching the key
pub fn delete_by_key<T: Entity>() -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?",
        T::TABLE,
        T::COLUMNS[T::KEY_INDEX].name
    )
}
