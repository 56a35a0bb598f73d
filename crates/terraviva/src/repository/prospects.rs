use rusqlite::{params, Row};

use super::{timestamp_now, RepositoryError};
use crate::db::Database;
use crate::domain::{NewProspect, Prospect};

fn prospect_from_row(row: &Row<'_>) -> rusqlite::Result<Prospect> {
    Ok(Prospect {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        phone: row.get(3)?,
        source: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        submitted_at: row.get(5)?,
        property_label: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        property_id: row.get(7)?,
        language: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
    })
}

/// All prospects, newest first. Prospects are an append-only log and carry
/// no activity flag.
pub fn list(db: &Database) -> Result<Vec<Prospect>, RepositoryError> {
    let conn = db.open()?;
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, source, submitted_at, property_label, property_id, language
         FROM prospects
         ORDER BY submitted_at DESC",
    )?;
    let rows = stmt.query_map([], |row| prospect_from_row(row))?;

    let mut prospects = Vec::new();
    for prospect in rows {
        prospects.push(prospect?);
    }
    Ok(prospects)
}

pub fn insert(db: &Database, prospect: &NewProspect) -> Result<i64, RepositoryError> {
    let conn = db.open()?;
    conn.execute(
        "INSERT INTO prospects (name, email, phone, source, submitted_at, property_label,
                                property_id, language)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            prospect.name,
            prospect.email,
            prospect.phone,
            prospect.source,
            timestamp_now(),
            prospect.property_label,
            prospect.property_id,
            prospect.language,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
