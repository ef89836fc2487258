//! Message schema cache
//!
//! The gateway returns the stream's message schema with each successful
//! stream-creation response. The schema is stable for the lifetime of the
//! process, so it is fetched or stored once and shared from then on.

use std::future::Future;

use polaris_types::PolarisResult;
use tokio::sync::OnceCell;

/// Write-once cache for the stream message schema
///
/// Concurrent initializers are collapsed into a single in-flight fetch;
/// losers of the race wait for the winner's result instead of issuing
/// their own request.
#[derive(Debug, Default)]
pub struct SchemaCache {
    cell: OnceCell<String>,
}

impl SchemaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a schema if none is cached yet
    ///
    /// Returns `true` if this call populated the cache. Later calls keep
    /// the original value, since the schema does not change mid-session.
    pub fn store(&self, schema: String) -> bool {
        self.cell.set(schema).is_ok()
    }

    /// The cached schema, if one has been stored
    pub fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// Return the cached schema, initializing it with `init` if empty
    ///
    /// A failed initialization leaves the cache empty so a later call can
    /// retry.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> PolarisResult<&str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PolarisResult<String>>,
    {
        self.cell.get_or_try_init(init).await.map(String::as_str)
    }
}
