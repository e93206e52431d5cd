use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

/// Read-mostly reference data keeps well; the public specialty and doctor
/// listings are served through this time-boxed cache. There is no write
/// invalidation — admin edits become visible when the entry expires.
pub const SPECIALTIES_TTL: Duration = Duration::from_secs(10 * 60);
pub const DOCTORS_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    data: Value,
    inserted_at: Instant,
    ttl: Duration,
}

#[derive(Default)]
pub struct ReferenceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            let entry = entries.get(key)?;
            if entry.inserted_at.elapsed() <= entry.ttl {
                debug!("Cache hit for {}", key);
                return Some(entry.data.clone());
            }
        }

        // Expired; drop the entry.
        self.entries.write().await.remove(key);
        None
    }

    pub async fn set(&self, key: &str, data: Value, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }
}
