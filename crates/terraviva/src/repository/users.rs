use rusqlite::{params, OptionalExtension};

use super::RepositoryError;
use crate::auth::password;
use crate::db::Database;
use crate::domain::CrmUserView;

/// Looks up the active user row for `username` and verifies the supplied
/// password against the stored argon2 hash. Unknown usernames and wrong
/// passwords both come back as `Ok(None)`; only storage or hash-format
/// trouble is an error.
pub fn authenticate(
    db: &Database,
    username: &str,
    password_attempt: &str,
) -> Result<Option<CrmUserView>, RepositoryError> {
    let conn = db.open()?;
    let row = conn
        .query_row(
            "SELECT id, username, password_hash, display_name
             FROM crm_users
             WHERE username = ?1 AND active = 1",
            params![username],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((id, username, hash, display_name)) = row else {
        return Ok(None);
    };

    match password::verify_password(password_attempt, &hash) {
        Ok(true) => Ok(Some(CrmUserView {
            id,
            username,
            display_name,
        })),
        Ok(false) => Ok(None),
        Err(err) => Err(RepositoryError::Unavailable(err.to_string())),
    }
}

pub fn count(db: &Database) -> Result<i64, RepositoryError> {
    let conn = db.open()?;
    let count = conn.query_row("SELECT COUNT(*) FROM crm_users", [], |row| row.get(0))?;
    Ok(count)
}
