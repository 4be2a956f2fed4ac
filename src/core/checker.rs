use crate::core::normalizer::{normalize, normalize_all};
use crate::core::notifier::{NotificationDispatcher, NotifyOutcome};
use crate::core::orchestrator::BatchOrchestrator;
use crate::core::summary;
use crate::domain::model::{
    BatchResult, CheckRequest, CheckResponse, Identifier, NotificationTarget,
};
use crate::domain::ports::SettingsStore;
use crate::config::settings::TargetSettings;
use crate::utils::error::{CheckerError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    NotifyTarget,
    Skip,
}

/// Everything one check produced. `notification` is `None` when delivery was
/// not requested.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub result: BatchResult,
    pub text: String,
    pub notification: Option<NotifyOutcome>,
    pub checked_at: DateTime<Utc>,
}

/// Machine-readable form of a `CheckReport`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub checked_at: DateTime<Utc>,
    #[serde(flatten)]
    pub response: CheckResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
}

impl From<&CheckReport> for JsonReport {
    fn from(report: &CheckReport) -> Self {
        Self {
            checked_at: report.checked_at,
            response: CheckResponse::from(&report.result),
            notification: report.notification.as_ref().map(ToString::to_string),
        }
    }
}

/// normalize -> run_batch -> format -> notify, shared by every front end.
pub struct CheckService<S: SettingsStore> {
    orchestrator: BatchOrchestrator,
    dispatcher: NotificationDispatcher,
    targets: TargetSettings<S>,
}

impl<S: SettingsStore> CheckService<S> {
    pub fn new(
        orchestrator: BatchOrchestrator,
        dispatcher: NotificationDispatcher,
        targets: TargetSettings<S>,
    ) -> Self {
        Self {
            orchestrator,
            dispatcher,
            targets,
        }
    }

    pub async fn check(&self, raw_input: &str, delivery: Delivery) -> CheckReport {
        self.check_identifiers(normalize(raw_input), delivery).await
    }

    /// Entry point for an HTTP front end: numbers arrive already split.
    pub async fn check_request(&self, request: &CheckRequest, delivery: Delivery) -> CheckResponse {
        let report = self
            .check_identifiers(normalize_all(&request.numbers), delivery)
            .await;
        CheckResponse::from(&report.result)
    }

    pub async fn check_identifiers(
        &self,
        identifiers: Vec<Identifier>,
        delivery: Delivery,
    ) -> CheckReport {
        let checked_at = Utc::now();
        let result = self.orchestrator.run_batch(&identifiers).await;
        let text = summary::format(&result);

        let notification = match delivery {
            Delivery::NotifyTarget => Some(self.notify(&text).await),
            Delivery::Skip => None,
        };

        CheckReport {
            result,
            text,
            notification,
            checked_at,
        }
    }

    /// Sends `text` to the configured target, if any.
    pub async fn notify(&self, text: &str) -> NotifyOutcome {
        let target = self.targets.current().await;
        self.dispatcher.notify(target.as_ref(), text).await
    }

    pub async fn target(&self) -> Option<NotificationTarget> {
        self.targets.current().await
    }

    pub async fn set_target(&self, raw: &str) -> Result<NotificationTarget> {
        let identifier =
            Identifier::parse(raw).ok_or_else(|| CheckerError::InvalidConfigValueError {
                field: "notification.target".to_string(),
                value: raw.to_string(),
                reason: "Phone number cannot be empty".to_string(),
            })?;
        let target = NotificationTarget::new(identifier);
        self.targets.set(target.clone()).await?;
        Ok(target)
    }
}
