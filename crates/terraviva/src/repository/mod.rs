use chrono::Local;

pub mod owners;
pub mod properties;
pub mod prospects;
pub mod users;

/// Error enumeration for repository failures. Absence is not a failure:
/// reads return `Ok(None)` for missing rows, mutations return `NotFound`
/// when no row was touched, and everything the storage engine raises
/// becomes `Unavailable`. Controllers map the two to 404 and 500.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        tracing::warn!(%err, "sqlite operation failed");
        RepositoryError::Unavailable(err.to_string())
    }
}

/// Server-stamped creation/registration timestamp; never client-supplied.
pub(crate) fn timestamp_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
