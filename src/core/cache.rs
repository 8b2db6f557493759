use async_trait::async_trait;

/// Key-value store whose entries expire after a fixed time-to-live.
///
/// Expired entries must read as absent whether or not they have been purged.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`, replacing any previous entry for `key`.
    async fn put(&self, key: K, value: V);

    /// Drops expired entries and returns how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Number of stored entries, expired ones included until purged.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
