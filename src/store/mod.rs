/// Persistence port
///
/// The engine never touches storage directly; it goes through this injected
/// get/set interface. Store failures are deliberately non-fatal: an
/// unreadable value reads as absent, and failed writes are logged and
/// dropped.
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Mutex;

use crate::error::FeedResult;

pub mod redis;

pub use self::redis::RedisStore;

/// Keys for engine-owned persisted state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Lifetime-seen identifier set of the novelty cache
    LifetimeSeen,
    /// Taste-profile counter snapshot
    TasteSnapshot,
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::LifetimeSeen => write!(f, "novelty:lifetime"),
            StoreKey::TasteSnapshot => write!(f, "taste:snapshot"),
        }
    }
}

/// Minimal async key-value store
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &StoreKey) -> FeedResult<Option<String>>;
    async fn set(&self, key: &StoreKey, value: String) -> FeedResult<()>;
}

/// Loads and deserializes a stored value, treating any failure as absence
pub async fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &StoreKey,
) -> Option<T> {
    match store.get(key).await {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable stored value");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Store read failed, treating as empty");
            None
        }
    }
}

/// Serializes and stores a value, logging and dropping any failure
pub async fn save_json<T: serde::Serialize>(store: &dyn KeyValueStore, key: &StoreKey, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Store serialization failed");
            return;
        }
    };

    if let Err(e) = store.set(key, json).await {
        tracing::warn!(key = %key, error = %e, "Store write failed");
    }
}

/// In-memory store for tests and for callers that opt out of persistence
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StoreKey) -> FeedResult<Option<String>> {
        let map = self.inner.lock().unwrap();
        Ok(map.get(&key.to_string()).cloned())
    }

    async fn set(&self, key: &StoreKey, value: String) -> FeedResult<()> {
        let mut map = self.inner.lock().unwrap();
        map.insert(key.to_string(), value);
        Ok(())
    }
}
