//! [`KvStore`] trait: the only way the rest of the system touches records.

use std::future::Future;

use crate::error::KvError;

/// Durable unique-key upsert and point lookup.
///
/// Implementations must be `Send + Sync` so one instance can serve every
/// request task. No locking or caching is layered on top: each call is one
/// atomic operation in the backing engine, and concurrent calls on the same
/// key may interleave.
pub trait KvStore: Send + Sync + 'static {
    /// Insert `value` under `key`, replacing any existing value.
    fn save(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), KvError>> + Send;

    /// Look up the value for `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, KvError>> + Send;
}
