use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::KeyValueStore;

pub const DEFAULT_KEY_PREFIX: &str = "tbk_";

/// Physical key names for the logical entries, sharing one namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub items: String,
    pub queue: String,
    pub claims: String,
    pub role: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            items: format!("{prefix}items"),
            queue: format!("{prefix}queue"),
            claims: format!("{prefix}claims"),
            role: format!("{prefix}role"),
        }
    }

    /// Keys holding the three collections. The role is not part of the data.
    pub fn collections(&self) -> [String; 3] {
        [self.items.clone(), self.queue.clone(), self.claims.clone()]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Whether a write reached the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    Saved,
    MemoryOnly,
}

impl Persisted {
    pub fn is_saved(self) -> bool {
        self == Persisted::Saved
    }
}

/// Values serialized up front so a batch is either fully encoded or dropped.
#[derive(Debug, Default)]
pub struct WriteBatch {
    entries: Vec<(String, String)>,
    encode_failed: bool,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(text) => self.entries.push((key.to_string(), text)),
            Err(err) => {
                warn!(key, error = %err, "failed to encode value for storage");
                self.encode_failed = true;
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fault-tolerant JSON layer over a [`KeyValueStore`].
///
/// Writes never fail from the caller's point of view: errors are logged and
/// reported as [`Persisted::MemoryOnly`]. Reads fall back to the supplied
/// default when the key is missing, unreadable or unparseable.
pub struct PersistentStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Persisted {
        self.save_many(WriteBatch::new().put(key, value)).await
    }

    pub async fn save_many(&self, batch: WriteBatch) -> Persisted {
        if batch.encode_failed {
            return Persisted::MemoryOnly;
        }
        if batch.is_empty() {
            return Persisted::Saved;
        }
        match self.store.put_many(&batch.entries).await {
            Ok(()) => {
                debug!(keys = batch.entries.len(), "persisted batch");
                Persisted::Saved
            }
            Err(err) => {
                warn!(error = %err, "storage write failed; keeping state in memory only");
                Persisted::MemoryOnly
            }
        }
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(err) => {
                warn!(key, error = %err, "storage read failed; using fallback");
                return fallback;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "stored value is not valid JSON for its type; using fallback");
                fallback
            }
        }
    }

    pub async fn clear(&self, keys: &[String]) -> Persisted {
        match self.store.remove_many(keys).await {
            Ok(()) => Persisted::Saved,
            Err(err) => {
                warn!(error = %err, "storage clear failed");
                Persisted::MemoryOnly
            }
        }
    }
}
