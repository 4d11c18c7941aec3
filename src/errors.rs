use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while operating the storefront.
///
/// The first group are user-facing failures that the caller is expected to
/// display and let the user retry. The rest come from the storage and
/// serialization layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Please login to complete your order")]
    AuthRequired,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Admin access required")]
    AdminRequired,

    #[error("Admin quick login is disabled")]
    AdminQuickLoginDisabled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Stored record '{key}' has version {found}, newer than this build understands")]
    UnsupportedVersion { key: String, found: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
