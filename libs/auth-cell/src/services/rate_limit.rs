use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

pub const MAX_ATTEMPTS: u32 = 5;
pub const ATTEMPT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Counts failed login attempts per client key. The login handler only
/// talks to this trait; the default implementation below is in-process.
#[async_trait]
pub trait AttemptCounter: Send + Sync {
    async fn is_limited(&self, key: &str) -> bool;
    async fn record_failure(&self, key: &str);
    async fn clear(&self, key: &str);
}

struct AttemptRecord {
    count: u32,
    last_attempt: Instant,
}

/// Fixed-window in-memory counter. Entries older than the window are
/// dropped on the next check, so a quiet client starts fresh.
pub struct InMemoryAttemptCounter {
    attempts: RwLock<HashMap<String, AttemptRecord>>,
    max_attempts: u32,
    window: Duration,
}

impl InMemoryAttemptCounter {
    pub fn new() -> Self {
        Self::with_limits(MAX_ATTEMPTS, ATTEMPT_WINDOW)
    }

    pub fn with_limits(max_attempts: u32, window: Duration) -> Self {
        Self {
            attempts: RwLock::new(HashMap::new()),
            max_attempts,
            window,
        }
    }
}

impl Default for InMemoryAttemptCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttemptCounter for InMemoryAttemptCounter {
    async fn is_limited(&self, key: &str) -> bool {
        let mut attempts = self.attempts.write().await;

        match attempts.get(key) {
            Some(record) if record.last_attempt.elapsed() > self.window => {
                attempts.remove(key);
                false
            }
            Some(record) => record.count >= self.max_attempts,
            None => false,
        }
    }

    async fn record_failure(&self, key: &str) {
        let mut attempts = self.attempts.write().await;
        let now = Instant::now();

        let record = attempts.entry(key.to_string()).or_insert(AttemptRecord {
            count: 0,
            last_attempt: now,
        });
        if now.duration_since(record.last_attempt) > self.window {
            record.count = 0;
        }
        record.count += 1;
        record.last_attempt = now;
    }

    async fn clear(&self, key: &str) {
        self.attempts.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn limits_after_max_failures() {
        let counter = InMemoryAttemptCounter::new();

        for _ in 0..4 {
            counter.record_failure("1.2.3.4").await;
        }
        assert!(!counter.is_limited("1.2.3.4").await);

        counter.record_failure("1.2.3.4").await;
        assert!(counter.is_limited("1.2.3.4").await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let counter = InMemoryAttemptCounter::new();

        for _ in 0..5 {
            counter.record_failure("1.2.3.4").await;
        }
        assert!(counter.is_limited("1.2.3.4").await);
        assert!(!counter.is_limited("5.6.7.8").await);
    }

    #[tokio::test]
    async fn clear_resets_the_counter() {
        let counter = InMemoryAttemptCounter::new();

        for _ in 0..5 {
            counter.record_failure("1.2.3.4").await;
        }
        counter.clear("1.2.3.4").await;
        assert!(!counter.is_limited("1.2.3.4").await);
    }

    #[tokio::test]
    async fn window_expiry_unblocks() {
        let counter = InMemoryAttemptCounter::with_limits(2, Duration::from_millis(20));

        counter.record_failure("1.2.3.4").await;
        counter.record_failure("1.2.3.4").await;
        assert!(counter.is_limited("1.2.3.4").await);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!counter.is_limited("1.2.3.4").await);
    }
}
