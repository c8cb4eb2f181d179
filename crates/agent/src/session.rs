//! Session state: clarification counters and recent turns
//!
//! - `InMemoryClarifyCounter` - per-session clarification rounds with TTL
//! - `SessionHistory` - bounded recent turns fed to the completion fallback
//!
//! Both are process-local. A deployment running several workers puts the
//! counter behind a shared store implementing [`ClarifyCounterStore`].

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use wallet_support_config::SessionConfig;
use wallet_support_core::{ClarifyCounterStore, Result, Turn};

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u32,
    expires_at: Instant,
}

/// Clarification counter kept in process memory
///
/// Increments go through the map's entry lock, so concurrent requests for
/// one session never lose an update. Every increment refreshes the TTL.
#[derive(Debug)]
pub struct InMemoryClarifyCounter {
    entries: DashMap<String, CounterEntry>,
    ttl: Duration,
}

impl Default for InMemoryClarifyCounter {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl InMemoryClarifyCounter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.clarify_ttl_seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ClarifyCounterStore for InMemoryClarifyCounter {
    async fn get(&self, session_id: &str) -> Result<u32> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(session_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.count)
            .unwrap_or(0))
    }

    async fn increment(&self, session_id: &str) -> Result<u32> {
        let now = Instant::now();
        let expires_at = now + self.ttl;
        let mut entry = self
            .entries
            .entry(session_id.to_string())
            .or_insert(CounterEntry {
                count: 0,
                expires_at,
            });
        if entry.expires_at <= now {
            entry.count = 0;
        }
        entry.count = entry.count.saturating_add(1);
        entry.expires_at = expires_at;
        Ok(entry.count)
    }

    async fn reset(&self, session_id: &str) -> Result<()> {
        self.entries.remove(session_id);
        Ok(())
    }

    fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Expired clarify counters removed");
        }
        removed
    }
}

#[derive(Debug)]
struct HistoryEntry {
    turns: Vec<Turn>,
    expires_at: Instant,
}

/// Recent conversation turns per session
///
/// A session's turns expire together, `ttl` after the last push.
#[derive(Debug)]
pub struct SessionHistory {
    sessions: DashMap<String, HistoryEntry>,
    max_turns: usize,
    ttl: Duration,
}

impl SessionHistory {
    pub fn new(max_turns: usize, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
            ttl,
        }
    }

    /// Snapshot of the stored turns, oldest first
    pub fn recent(&self, session_id: &str) -> Vec<Turn> {
        let now = Instant::now();
        self.sessions
            .get(session_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.turns.clone())
            .unwrap_or_default()
    }

    pub fn push(&self, session_id: &str, turn: Turn) {
        let now = Instant::now();
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| HistoryEntry {
                turns: Vec::new(),
                expires_at: now,
            });
        if entry.expires_at <= now {
            entry.turns.clear();
        }
        entry.turns.push(turn);
        if entry.turns.len() > self.max_turns {
            let excess = entry.turns.len() - self.max_turns;
            entry.turns.drain(..excess);
        }
        entry.expires_at = now + self.ttl;
    }

    pub fn clear(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Drop expired sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "Expired session histories removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_increment_and_reset() {
        let counter = InMemoryClarifyCounter::default();
        assert_eq!(counter.get("s1").await.unwrap(), 0);
        assert_eq!(counter.increment("s1").await.unwrap(), 1);
        assert_eq!(counter.increment("s1").await.unwrap(), 2);
        assert_eq!(counter.get("s2").await.unwrap(), 0);

        counter.reset("s1").await.unwrap();
        assert_eq!(counter.get("s1").await.unwrap(), 0);
        assert!(counter.is_empty());
    }

    #[tokio::test]
    async fn test_expired_counter_reads_zero() {
        let counter = InMemoryClarifyCounter::new(Duration::from_millis(20));
        counter.increment("s1").await.unwrap();
        counter.increment("s1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(counter.get("s1").await.unwrap(), 0);
        assert_eq!(counter.increment("s1").await.unwrap(), 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.cleanup_expired(), 1);
        assert!(counter.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments() {
        let counter = Arc::new(InMemoryClarifyCounter::default());
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move { counter.increment("shared").await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.get("shared").await.unwrap(), 50);
    }

    #[test]
    fn test_history_is_bounded() {
        let history = SessionHistory::new(2, Duration::from_secs(60));
        history.push("s", Turn::user("một"));
        history.push("s", Turn::assistant("hai"));
        history.push("s", Turn::user("ba"));

        let turns = history.recent("s");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "hai");
        assert_eq!(turns[1].content, "ba");

        history.clear("s");
        assert!(history.recent("s").is_empty());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_swept() {
        let ttl = Duration::from_millis(20);
        let counter = InMemoryClarifyCounter::new(ttl);
        let history = SessionHistory::new(3, ttl);
        for i in 0..100 {
            let id = format!("s{}", i);
            counter.increment(&id).await.unwrap();
            history.push(&id, Turn::user("giúp mình với"));
        }
        assert_eq!(counter.len(), 100);
        assert_eq!(history.len(), 100);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(history.recent("s0").is_empty());
        counter.increment("fresh").await.unwrap();
        history.push("fresh", Turn::user("rút tiền"));

        assert_eq!(counter.cleanup_expired(), 100);
        assert_eq!(history.cleanup_expired(), 100);
        assert_eq!(counter.len(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.recent("fresh").len(), 1);
    }
}
