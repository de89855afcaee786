use async_trait::async_trait;
use vecgate_common::Result;

/// Minimal key-value cache surface
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Stored value, `None` on a miss
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl_secs`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}
