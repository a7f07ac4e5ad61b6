use crate::db::schema::MAINTENANCE_DATABASE;
use std::time::Duration;

/// Rows pulled from the server per cursor round trip in `entries()`.
pub const DEFAULT_CURSOR_BATCH_SIZE: u32 = 50;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs for [`PostgresKeyValueStorage`](crate::db::PostgresKeyValueStorage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    /// Always-present database used to create the target database.
    pub maintenance_database: String,
    /// Ceiling of the live pool opened during initialization.
    pub max_connections: u32,
    /// How long an operation waits for a pooled connection.
    pub acquire_timeout: Duration,
    pub cursor_batch_size: u32,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            maintenance_database: MAINTENANCE_DATABASE.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            cursor_batch_size: DEFAULT_CURSOR_BATCH_SIZE,
        }
    }
}
