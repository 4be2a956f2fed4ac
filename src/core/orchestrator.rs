use crate::core::directory::DirectoryAdapter;
use crate::domain::model::{BatchResult, Identifier, LookupOutcome};
use crate::domain::session::SessionState;
use futures::StreamExt;
use std::future::Future;
use std::time::{Duration, Instant};

pub const CANCELLED_DETAIL: &str = "cancelled before completion";

/// How a batch is driven. The default is one lookup at a time, no retries and
/// no deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPolicy {
    pub concurrency: usize,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub deadline: Option<Duration>,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            concurrency: 1,
            retry_attempts: 0,
            retry_delay: Duration::from_millis(500),
            deadline: None,
        }
    }
}

pub struct BatchOrchestrator {
    adapter: DirectoryAdapter,
    policy: BatchPolicy,
}

impl BatchOrchestrator {
    pub fn new(adapter: DirectoryAdapter, policy: BatchPolicy) -> Self {
        Self { adapter, policy }
    }

    /// Checks every identifier and returns the outcomes in input order. Never
    /// fails: lookup problems become `Error` outcomes. A configured deadline
    /// cancels the rest of the batch.
    pub async fn run_batch(&self, identifiers: &[Identifier]) -> BatchResult {
        match self.policy.deadline {
            Some(deadline) => {
                self.run_batch_until(identifiers, tokio::time::sleep(deadline))
                    .await
            }
            None => {
                self.run_batch_until(identifiers, std::future::pending::<()>())
                    .await
            }
        }
    }

    /// Like `run_batch`, but stops dispatching once `cancel` resolves. Lookups
    /// that did not complete by then are reported as `Error` outcomes, so work
    /// already done is kept.
    pub async fn run_batch_until<F>(&self, identifiers: &[Identifier], cancel: F) -> BatchResult
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let concurrency = self.policy.concurrency.max(1);
        tracing::info!(
            total = identifiers.len(),
            concurrency,
            "Starting registration check batch"
        );

        let mut slots: Vec<Option<LookupOutcome>> = vec![None; identifiers.len()];
        let mut cancelled = false;
        {
            // completion order is irrelevant: each outcome goes back to its input index
            let mut lookups = futures::stream::iter(identifiers.iter().enumerate())
                .map(|(index, identifier)| async move {
                    (index, self.check_with_retry(identifier).await)
                })
                .buffer_unordered(concurrency);

            tokio::pin!(cancel);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel => {
                        cancelled = true;
                        break;
                    }
                    next = lookups.next() => match next {
                        Some((index, outcome)) => slots[index] = Some(outcome),
                        None => break,
                    },
                }
            }
        }

        let outcomes: Vec<LookupOutcome> = slots
            .into_iter()
            .zip(identifiers)
            .map(|(slot, identifier)| {
                slot.unwrap_or_else(|| LookupOutcome::error(identifier.clone(), CANCELLED_DETAIL))
            })
            .collect();
        let result = BatchResult::new(outcomes);

        if cancelled && result.error_count() > 0 {
            tracing::warn!(
                unfinished = result
                    .outcomes()
                    .iter()
                    .filter(|o| o.error_detail() == Some(CANCELLED_DETAIL))
                    .count(),
                "Batch cancelled before all lookups completed"
            );
        }
        tracing::info!(
            registered = result.registered_count(),
            not_registered = result.not_registered_count(),
            errors = result.error_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Registration check batch finished"
        );

        result
    }

    async fn check_with_retry(&self, identifier: &Identifier) -> LookupOutcome {
        let mut attempt = 0;
        loop {
            let outcome = self.adapter.check_one(identifier).await;
            if !outcome.is_error() || attempt >= self.policy.retry_attempts {
                return outcome;
            }
            if self.adapter.session().state() == SessionState::LoggedOut {
                // no amount of retrying helps until the session is linked again
                return outcome;
            }

            attempt += 1;
            tracing::debug!(
                %identifier,
                attempt,
                max_attempts = self.policy.retry_attempts,
                "Retrying lookup"
            );
            tokio::time::sleep(self.policy.retry_delay).await;
        }
    }
}
