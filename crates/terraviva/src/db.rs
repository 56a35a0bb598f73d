use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::auth::password;
use crate::repository::{timestamp_now, RepositoryError};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_DISPLAY_NAME: &str = "Administrador Principal";

/// Handle on the SQLite database file. Every logical operation opens its own
/// connection and releases it on drop, so no connection outlives the call
/// that needed it.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn open(&self) -> Result<Connection, RepositoryError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Idempotently ensures the four tables exist. Safe on every startup.
    pub fn init_schema(&self) -> Result<(), RepositoryError> {
        let conn = self.open()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS owners (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                registered_at TEXT NOT NULL,
                active INTEGER DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS properties (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER,
                title_es TEXT NOT NULL,
                description_es TEXT,
                title_en TEXT NOT NULL,
                description_en TEXT,
                price TEXT,
                location TEXT,
                kind TEXT,
                status TEXT DEFAULT 'available',
                images TEXT,
                contact_phone TEXT,
                created_at TEXT NOT NULL,
                active INTEGER DEFAULT 1,
                FOREIGN KEY (owner_id) REFERENCES owners (id)
            );

            CREATE TABLE IF NOT EXISTS prospects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT NOT NULL,
                source TEXT,
                submitted_at TEXT NOT NULL,
                property_label TEXT,
                property_id INTEGER,
                language TEXT
            );

            CREATE TABLE IF NOT EXISTS crm_users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                display_name TEXT NOT NULL,
                registered_at TEXT NOT NULL,
                active INTEGER DEFAULT 1
            );
            "#,
        )?;
        Ok(())
    }

    /// Inserts the default administrative account when the user table is
    /// empty. Returns whether a row was created. The password is stored as
    /// an argon2 hash; the plaintext exists only in this constant.
    pub fn seed_default_user(&self) -> Result<bool, RepositoryError> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM crm_users", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(false);
        }

        let hash = password::hash_password(DEFAULT_ADMIN_PASSWORD)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        conn.execute(
            "INSERT INTO crm_users (username, password_hash, display_name, registered_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                DEFAULT_ADMIN_USERNAME,
                hash,
                DEFAULT_ADMIN_DISPLAY_NAME,
                timestamp_now()
            ],
        )?;
        Ok(true)
    }
}
