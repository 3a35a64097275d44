//! Assistant-to-thread mapping for the stateful path.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;

use openai_sdk::Client;
use openai_sdk::OpenAIError;
use tracing::debug;

/// Caches one server-side thread per assistant id.
///
/// Creation is serialized per assistant id: concurrent first calls for the
/// same assistant share one `createThread` request. Cached lookups take only
/// a read lock.
#[derive(Debug, Default)]
pub struct ThreadCache {
    threads: RwLock<HashMap<String, String>>,
    creation_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ThreadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached thread id for an assistant.
    pub fn get(&self, assistant_id: &str) -> Option<String> {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(assistant_id)
            .cloned()
    }

    /// Return the cached thread for `assistant_id`, creating one on a miss.
    ///
    /// `client` carries the credential used for the creation request. A
    /// failed creation leaves the cache untouched.
    pub async fn get_or_create(
        &self,
        client: &Client,
        assistant_id: &str,
    ) -> Result<String, OpenAIError> {
        if let Some(thread_id) = self.get(assistant_id) {
            debug!(assistant = short_id(assistant_id), %thread_id, "thread cache hit");
            return Ok(thread_id);
        }

        let lock = self.creation_lock(assistant_id);
        let _guard = lock.lock().await;

        // Another caller may have created it while we waited.
        if let Some(thread_id) = self.get(assistant_id) {
            debug!(assistant = short_id(assistant_id), %thread_id, "thread created by concurrent call");
            return Ok(thread_id);
        }

        debug!(assistant = short_id(assistant_id), "thread cache miss, creating thread");
        let thread = client.threads().create().await?;
        self.threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(assistant_id.to_string(), thread.id.clone());
        debug!(assistant = short_id(assistant_id), thread_id = %thread.id, "thread cached");

        Ok(thread.id)
    }

    fn creation_lock(&self, assistant_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.creation_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(assistant_id.to_string())
            .or_default()
            .clone()
    }

    /// Forget the thread of one assistant. The remote thread is kept.
    pub fn clear(&self, assistant_id: &str) -> bool {
        let removed = self
            .threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(assistant_id)
            .is_some();
        let mut locks = self
            .creation_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(assistant_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(assistant_id);
        }
        if removed {
            debug!(assistant = short_id(assistant_id), "thread mapping cleared");
        }
        removed
    }

    /// Forget every thread.
    ///
    /// Creation locks held by an in-flight `get_or_create` survive; the rest
    /// are dropped.
    pub fn clear_all(&self) {
        self.threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.creation_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of cached threads.
    pub fn count(&self) -> usize {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Leading characters of an id for log lines.
pub(crate) fn short_id(id: &str) -> &str {
    match id.char_indices().nth(10) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

#[cfg(test)]
#[path = "thread_cache.test.rs"]
mod tests;
