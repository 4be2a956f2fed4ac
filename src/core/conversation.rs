use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_CONVERSATION_TTL: Duration = Duration::from_secs(300);
pub const MAX_CONVERSATION_TTL: Duration = Duration::from_secs(86_400);

/// Short-lived per-sender state for replies that continue an earlier command.
/// Each sender has at most one pending entry; entries expire after the TTL so
/// a forgotten prompt does not capture a message sent much later.
pub struct ConversationStore<T> {
    ttl: Duration,
    pending: Mutex<HashMap<String, (Instant, T)>>,
}

impl<T: Send> ConversationStore<T> {
    /// `ttl` is capped at `MAX_CONVERSATION_TTL`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_CONVERSATION_TTL),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Starts (or replaces) the pending state for `sender`.
    pub async fn begin(&self, sender: &str, state: T) {
        let expires_at = Instant::now() + self.ttl;
        self.pending
            .lock()
            .await
            .insert(sender.to_string(), (expires_at, state));
    }

    /// Removes and returns the pending state for `sender`, unless it expired.
    pub async fn take(&self, sender: &str) -> Option<T> {
        let (expires_at, state) = self.pending.lock().await.remove(sender)?;
        if Instant::now() >= expires_at {
            tracing::debug!(sender, "Pending conversation expired");
            return None;
        }
        Some(state)
    }

    pub async fn cancel(&self, sender: &str) -> bool {
        self.pending.lock().await.remove(sender).is_some()
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, (expires_at, _)| *expires_at > now);
        before - pending.len()
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl<T: Send> Default for ConversationStore<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSATION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_is_scoped_to_sender() {
        let store = ConversationStore::default();
        store.begin("alice", "awaiting numbers").await;

        assert_eq!(store.take("bob").await, None);
        assert_eq!(store.take("alice").await, Some("awaiting numbers"));
        assert_eq!(store.take("alice").await, None);
    }

    #[tokio::test]
    async fn test_begin_replaces_previous_state() {
        let store = ConversationStore::default();
        store.begin("alice", 1).await;
        store.begin("alice", 2).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.take("alice").await, Some(2));
    }

    #[tokio::test]
    async fn test_expired_state_is_ignored() {
        let store = ConversationStore::new(Duration::from_millis(20));
        store.begin("alice", "awaiting target").await;
        store.begin("bob", "awaiting target").await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.take("alice").await, None);
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_capped() {
        let store = ConversationStore::new(Duration::from_secs(i64::MAX as u64));
        store.begin("alice", "awaiting numbers").await;
        assert_eq!(store.take("alice").await, Some("awaiting numbers"));
    }

    #[tokio::test]
    async fn test_cancel() {
        let store = ConversationStore::default();
        store.begin("alice", ()).await;
        assert!(store.cancel("alice").await);
        assert!(!store.cancel("alice").await);
    }
}
