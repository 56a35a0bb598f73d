use rusqlite::{params, OptionalExtension, Row};

use super::{timestamp_now, RepositoryError};
use crate::db::Database;
use crate::domain::{NewOwner, Owner};

fn owner_from_row(row: &Row<'_>) -> rusqlite::Result<Owner> {
    Ok(Owner {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        phone: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        registered_at: row.get(4)?,
    })
}

/// All active owners, ordered by name.
pub fn list(db: &Database) -> Result<Vec<Owner>, RepositoryError> {
    let conn = db.open()?;
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, registered_at
         FROM owners
         WHERE active = 1
         ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], |row| owner_from_row(row))?;

    let mut owners = Vec::new();
    for owner in rows {
        owners.push(owner?);
    }
    Ok(owners)
}

/// Single active owner by id; `None` when missing or soft-deleted.
pub fn get(db: &Database, id: i64) -> Result<Option<Owner>, RepositoryError> {
    let conn = db.open()?;
    let owner = conn
        .query_row(
            "SELECT id, name, email, phone, registered_at
             FROM owners
             WHERE id = ?1 AND active = 1",
            params![id],
            |row| owner_from_row(row),
        )
        .optional()?;
    Ok(owner)
}

pub fn insert(db: &Database, owner: &NewOwner) -> Result<i64, RepositoryError> {
    let conn = db.open()?;
    conn.execute(
        "INSERT INTO owners (name, email, phone, registered_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![owner.name, owner.email, owner.phone, timestamp_now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(db: &Database, id: i64, owner: &NewOwner) -> Result<(), RepositoryError> {
    let conn = db.open()?;
    let changed = conn.execute(
        "UPDATE owners
         SET name = ?1, email = ?2, phone = ?3
         WHERE id = ?4 AND active = 1",
        params![owner.name, owner.email, owner.phone, id],
    )?;
    if changed == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Clears the active flag. The row stays in storage; listed properties keep
/// their (now dangling) owner reference.
pub fn soft_delete(db: &Database, id: i64) -> Result<(), RepositoryError> {
    let conn = db.open()?;
    let changed = conn.execute(
        "UPDATE owners SET active = 0 WHERE id = ?1 AND active = 1",
        params![id],
    )?;
    if changed == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
