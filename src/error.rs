use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

/// Errors raised by storage operations.
///
/// Driver and serialization failures are passed through untouched so callers
/// see the underlying failure kind.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Storage is not initialized; call initialize() first")]
    NotReady,

    #[error("Invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the error came from the database driver.
    pub fn is_database(&self) -> bool {
        matches!(self, StoreError::Database(_))
    }
}

/// The single failure kind surfaced by the initialization hook, whichever
/// provisioning step failed.
#[derive(Debug, ThisError)]
#[error("Error initializing PostgresKeyValueStorage: {source}")]
pub struct InitializationError {
    #[source]
    source: StoreError,
}

impl InitializationError {
    pub fn cause(&self) -> &StoreError {
        &self.source
    }
}

impl From<StoreError> for InitializationError {
    fn from(source: StoreError) -> Self {
        Self { source }
    }
}

impl From<SqlxError> for InitializationError {
    fn from(e: SqlxError) -> Self {
        StoreError::from(e).into()
    }
}
