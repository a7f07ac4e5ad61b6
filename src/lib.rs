pub mod config;
pub mod db;
pub mod error;
pub mod storage;

pub use db::{ConnectionDescriptor, PostgresKeyValueStorage, StorageOptions};
pub use error::{InitializationError, StoreError};
pub use storage::{Initializer, KeyValueStorage};
