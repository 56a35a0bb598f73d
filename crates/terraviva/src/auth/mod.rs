pub mod password;
pub mod session;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("session token signing failed: {0}")]
    Sign(String),
    #[error("session token rejected")]
    InvalidToken,
    #[error("no active session")]
    MissingSession,
}
