//! Key-value store seam used for challenge persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

// ============================================================================
// KeyValueStore: user-provided persistence layer
// ============================================================================

/// Minimal JSON key-value store addressed by opaque string paths.
///
/// Implementations wrap whatever database backs the deployment. Usable as a
/// trait object via `Arc<dyn KeyValueStore>`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `path`. Deleting a missing path is not an error.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Read and remove `path`.
    ///
    /// The default is get-then-delete, which two concurrent callers can both
    /// observe. Stores with a conditional or transactional delete should
    /// override this so at most one caller receives the value.
    async fn take(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let value = self.get(path).await?;
        self.delete(path).await?;
        Ok(value)
    }
}

/// Store-level error (wraps arbitrary error strings from the backing store).
#[derive(Debug, Clone)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-process store. `take` is atomic under the map lock.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.lock().contains_key(path)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.entries.lock().insert(path.to_string(), value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(path);
        Ok(())
    }

    async fn take(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().remove(path))
    }
}
