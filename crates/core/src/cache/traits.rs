use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for the distributed byte cache.
///
/// Keys are opaque strings; values are raw bytes. Per-key get/set are
/// assumed atomic by the backend. The repository treats the cache as a
/// pure side-channel: the entity store stays authoritative.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Extends the expiration of an existing key without touching its value.
    ///
    /// A no-op when the key is absent.
    async fn refresh(&self, key: &str) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;
}
