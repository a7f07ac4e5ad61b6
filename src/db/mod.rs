//! PostgreSQL backend for the key-value storage contract.
//!
//! Layout:
//! - `descriptor.rs`: connection string parsing and redaction
//! - `schema.rs`: SQL text and identifier quoting
//! - `provision.rs`: idempotent database and table creation
//! - `cursor.rs`: server-side cursor used by `entries()`
//! - `postgres.rs`: the storage itself

pub mod cursor;
pub mod descriptor;
pub mod options;
pub mod postgres;
pub mod provision;
pub mod schema;

pub use descriptor::ConnectionDescriptor;
pub use options::StorageOptions;
pub use postgres::PostgresKeyValueStorage;
