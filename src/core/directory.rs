use crate::domain::model::{Identifier, LookupOutcome};
use crate::domain::ports::Directory;
use crate::domain::session::{SessionEvent, SessionMonitor, SessionState};
use crate::utils::error::CheckerError;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Turns one directory call into a `LookupOutcome`. Failures are captured as
/// `Error` outcomes and never returned to the caller. No retries here.
#[derive(Clone)]
pub struct DirectoryAdapter {
    directory: Arc<dyn Directory>,
    session: Arc<SessionMonitor>,
    timeout: Duration,
}

impl DirectoryAdapter {
    pub fn new(directory: Arc<dyn Directory>, session: Arc<SessionMonitor>) -> Self {
        Self {
            directory,
            session,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(&self) -> &Arc<SessionMonitor> {
        &self.session
    }

    pub async fn check_one(&self, identifier: &Identifier) -> LookupOutcome {
        if let Err(e) = self.session.ensure_available() {
            tracing::debug!(%identifier, "Skipping lookup: {}", e);
            return LookupOutcome::error(identifier.clone(), e.to_string());
        }

        let call = self.directory.check_registration(identifier);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(registration)) => {
                tracing::debug!(%identifier, ?registration, "Lookup completed");
                LookupOutcome::from_registration(identifier.clone(), &registration)
            }
            Ok(Err(e)) => {
                if let CheckerError::SessionUnavailable {
                    state: SessionState::LoggedOut,
                } = &e
                {
                    self.session.apply(SessionEvent::Closed { logged_out: true });
                }
                tracing::warn!(%identifier, error = %e, "Lookup failed");
                LookupOutcome::error(identifier.clone(), e.to_string())
            }
            Err(_elapsed) => {
                let e = CheckerError::Timeout {
                    millis: self.timeout.as_millis() as u64,
                };
                tracing::warn!(%identifier, "Lookup timed out");
                LookupOutcome::error(identifier.clone(), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LookupStatus, Registration};
    use crate::utils::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedDirectory {
        calls: AtomicUsize,
        answer: fn(&Identifier) -> Result<Registration>,
        delay: Option<Duration>,
    }

    impl ScriptedDirectory {
        fn new(answer: fn(&Identifier) -> Result<Registration>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
                delay: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl Directory for ScriptedDirectory {
        async fn check_registration(&self, identifier: &Identifier) -> Result<Registration> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.answer)(identifier)
        }
    }

    fn id(raw: &str) -> Identifier {
        Identifier::parse(raw).unwrap()
    }

    fn adapter(directory: Arc<ScriptedDirectory>) -> DirectoryAdapter {
        DirectoryAdapter::new(directory, Arc::new(SessionMonitor::connected()))
    }

    #[tokio::test]
    async fn test_both_result_shapes_map_to_same_status() {
        let flag = adapter(Arc::new(ScriptedDirectory::new(|_| Ok(Registration::Flag(true)))));
        let list = adapter(Arc::new(ScriptedDirectory::new(|_| Ok(Registration::Matches(2)))));
        let empty = adapter(Arc::new(ScriptedDirectory::new(|_| Ok(Registration::Matches(0)))));

        assert_eq!(flag.check_one(&id("1")).await.status(), LookupStatus::Registered);
        assert_eq!(list.check_one(&id("1")).await.status(), LookupStatus::Registered);
        assert_eq!(empty.check_one(&id("1")).await.status(), LookupStatus::NotRegistered);
    }

    #[tokio::test]
    async fn test_failure_is_captured_as_outcome() {
        let directory = Arc::new(ScriptedDirectory::new(|_| {
            Err(CheckerError::DirectoryError {
                message: "invalid number".to_string(),
            })
        }));
        let outcome = adapter(directory.clone()).check_one(&id("abc")).await;

        assert!(outcome.is_error());
        assert_eq!(
            outcome.error_detail(),
            Some("Directory rejected the request: invalid number")
        );
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out() {
        let mut directory = ScriptedDirectory::new(|_| Ok(Registration::Flag(true)));
        directory.delay = Some(Duration::from_secs(5));
        let adapter = adapter(Arc::new(directory)).with_timeout(Duration::from_millis(50));

        let outcome = adapter.check_one(&id("1")).await;
        assert!(outcome.is_error());
        assert_eq!(outcome.error_detail(), Some("Operation timed out after 50ms"));
    }

    #[tokio::test]
    async fn test_unavailable_session_fails_fast_without_calling_directory() {
        let directory = Arc::new(ScriptedDirectory::new(|_| Ok(Registration::Flag(true))));
        let adapter = DirectoryAdapter::new(
            directory.clone(),
            Arc::new(SessionMonitor::new(SessionState::Connecting)),
        );

        let outcome = adapter.check_one(&id("1")).await;
        assert!(outcome.is_error());
        assert_eq!(outcome.error_detail(), Some("Session unavailable (connecting)"));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_logged_out_response_moves_session_to_logged_out() {
        let directory = Arc::new(ScriptedDirectory::new(|_| {
            Err(CheckerError::SessionUnavailable {
                state: SessionState::LoggedOut,
            })
        }));
        let adapter = adapter(directory);

        assert!(adapter.check_one(&id("1")).await.is_error());
        assert_eq!(adapter.session().state(), SessionState::LoggedOut);
    }
}
