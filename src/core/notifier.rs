use crate::domain::model::NotificationTarget;
use crate::domain::ports::Notifier;
use std::fmt;
use std::sync::Arc;

/// Result of a single delivery attempt. Kept apart from the batch result:
/// a failed delivery says nothing about the correctness of the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    NoTargetConfigured,
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyOutcome::Delivered)
    }
}

impl fmt::Display for NotifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyOutcome::Delivered => f.write_str("summary delivered"),
            NotifyOutcome::NoTargetConfigured => f.write_str("no notification target configured"),
            NotifyOutcome::Failed(detail) => write!(f, "delivery failed: {}", detail),
        }
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// One attempt, no retry.
    pub async fn notify(&self, target: Option<&NotificationTarget>, text: &str) -> NotifyOutcome {
        let Some(target) = target else {
            tracing::warn!("Notification target is not set; skipping summary delivery");
            return NotifyOutcome::NoTargetConfigured;
        };

        match self.notifier.send(target.identifier(), text).await {
            Ok(()) => {
                tracing::info!(to = %target.identifier(), "Summary delivered");
                NotifyOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!(to = %target.identifier(), error = %e, "Failed to deliver summary");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Identifier;
    use crate::utils::error::{CheckerError, Result};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, to: &Identifier, text: &str) -> Result<()> {
            self.sent.lock().await.push((to.to_string(), text.to_string()));
            if self.fail {
                return Err(CheckerError::DirectoryError {
                    message: "send rejected".to_string(),
                });
            }
            Ok(())
        }
    }

    fn target(raw: &str) -> NotificationTarget {
        NotificationTarget::new(Identifier::parse(raw).unwrap())
    }

    #[tokio::test]
    async fn test_delivers_to_target() {
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let outcome = dispatcher.notify(Some(&target("923001234567")), "report").await;

        assert_eq!(outcome, NotifyOutcome::Delivered);
        assert_eq!(
            *notifier.sent.lock().await,
            vec![("923001234567".to_string(), "report".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_target_does_not_send() {
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let outcome = dispatcher.notify(None, "report").await;

        assert_eq!(outcome, NotifyOutcome::NoTargetConfigured);
        assert!(notifier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_single_attempt() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let dispatcher = NotificationDispatcher::new(notifier.clone());

        let outcome = dispatcher.notify(Some(&target("1")), "report").await;

        assert_eq!(
            outcome,
            NotifyOutcome::Failed("Directory rejected the request: send rejected".to_string())
        );
        assert_eq!(notifier.sent.lock().await.len(), 1);
        assert!(!outcome.is_delivered());
    }
}
