//! Contracts a host application uses to drive a storage backend.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::InitializationError;

/// One-shot startup hook. Hosts call it before routing any other call to the
/// implementor; calling it again after success is a no-op.
#[async_trait]
pub trait Initializer: Send + Sync {
    async fn initialize(&self) -> Result<(), InitializationError>;
}

/// String-keyed storage of `V` values.
#[async_trait]
pub trait KeyValueStorage<V>: Send + Sync
where
    V: Send + Sync,
{
    type Error: std::error::Error + Send + Sync + 'static;

    /// `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<V>, Self::Error>;

    async fn has(&self, key: &str) -> Result<bool, Self::Error>;

    /// Insert or overwrite. Returns the storage so calls can be chained.
    async fn set<'a>(&'a self, key: &str, value: &V) -> Result<&'a Self, Self::Error>;

    /// True when a stored entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, Self::Error>;

    /// Lazily stream every stored entry, in no particular order.
    fn entries(&self) -> BoxStream<'_, Result<(String, V), Self::Error>>;
}
