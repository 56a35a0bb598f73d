use rusqlite::{params, OptionalExtension, Row};

use super::{timestamp_now, RepositoryError};
use crate::db::Database;
use crate::domain::{NewProperty, Property};

const JOINED_COLUMNS: &str = "p.id, p.owner_id, p.title_es, p.description_es, p.title_en, \
     p.description_en, p.price, p.location, p.kind, p.status, p.images, p.contact_phone, \
     p.created_at, o.name";

/// The images column holds a JSON-encoded array of relative paths. Anything
/// null, empty, or unparseable decodes to an empty list.
fn decode_images(raw: Option<String>) -> Vec<String> {
    raw.filter(|value| !value.is_empty())
        .and_then(|value| serde_json::from_str(&value).ok())
        .unwrap_or_default()
}

fn encode_images(images: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(images).map_err(|err| RepositoryError::Unavailable(err.to_string()))
}

fn property_from_row(row: &Row<'_>, with_owner: bool) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title_es: row.get(2)?,
        description_es: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        title_en: row.get(4)?,
        description_en: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        price: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        location: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        kind: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        status: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        images: decode_images(row.get(10)?),
        contact_phone: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
        created_at: row.get(12)?,
        owner_name: if with_owner { row.get(13)? } else { None },
    })
}

/// All active properties with the owner name joined in, newest first.
pub fn list(db: &Database) -> Result<Vec<Property>, RepositoryError> {
    let conn = db.open()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {JOINED_COLUMNS}
         FROM properties p
         LEFT JOIN owners o ON p.owner_id = o.id
         WHERE p.active = 1
         ORDER BY p.created_at DESC"
    ))?;
    let rows = stmt.query_map([], |row| property_from_row(row, true))?;

    let mut properties = Vec::new();
    for property in rows {
        properties.push(property?);
    }
    Ok(properties)
}

/// Single active property with the owner join; `None` when missing or
/// soft-deleted.
pub fn get(db: &Database, id: i64) -> Result<Option<Property>, RepositoryError> {
    let conn = db.open()?;
    let property = conn
        .query_row(
            &format!(
                "SELECT {JOINED_COLUMNS}
                 FROM properties p
                 LEFT JOIN owners o ON p.owner_id = o.id
                 WHERE p.id = ?1 AND p.active = 1"
            ),
            params![id],
            |row| property_from_row(row, true),
        )
        .optional()?;
    Ok(property)
}

/// Active properties for one owner, newest first. No owner-name join.
pub fn list_by_owner(db: &Database, owner_id: i64) -> Result<Vec<Property>, RepositoryError> {
    let conn = db.open()?;
    let mut stmt = conn.prepare(
        "SELECT p.id, p.owner_id, p.title_es, p.description_es, p.title_en, p.description_en,
                p.price, p.location, p.kind, p.status, p.images, p.contact_phone, p.created_at
         FROM properties p
         WHERE p.owner_id = ?1 AND p.active = 1
         ORDER BY p.created_at DESC",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| property_from_row(row, false))?;

    let mut properties = Vec::new();
    for property in rows {
        properties.push(property?);
    }
    Ok(properties)
}

pub fn insert(db: &Database, property: &NewProperty) -> Result<i64, RepositoryError> {
    let images = encode_images(&property.images)?;
    let conn = db.open()?;
    conn.execute(
        "INSERT INTO properties (owner_id, title_es, description_es, title_en, description_en,
                                 price, location, kind, status, images, contact_phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            property.owner_id,
            property.title_es,
            property.description_es,
            property.title_en,
            property.description_en,
            property.price,
            property.location,
            property.kind,
            property.status,
            images,
            property.contact_phone,
            timestamp_now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(db: &Database, id: i64, property: &NewProperty) -> Result<(), RepositoryError> {
    let images = encode_images(&property.images)?;
    let conn = db.open()?;
    let changed = conn.execute(
        "UPDATE properties
         SET owner_id = ?1, title_es = ?2, description_es = ?3, title_en = ?4,
             description_en = ?5, price = ?6, location = ?7, kind = ?8, status = ?9,
             images = ?10, contact_phone = ?11
         WHERE id = ?12 AND active = 1",
        params![
            property.owner_id,
            property.title_es,
            property.description_es,
            property.title_en,
            property.description_en,
            property.price,
            property.location,
            property.kind,
            property.status,
            images,
            property.contact_phone,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

pub fn soft_delete(db: &Database, id: i64) -> Result<(), RepositoryError> {
    let conn = db.open()?;
    let changed = conn.execute(
        "UPDATE properties SET active = 0 WHERE id = ?1 AND active = 1",
        params![id],
    )?;
    if changed == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
