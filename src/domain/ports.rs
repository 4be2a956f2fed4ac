use crate::domain::model::{Identifier, Registration, Settings};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The external "is this number on WhatsApp" capability.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn check_registration(&self, identifier: &Identifier) -> Result<Registration>;
}

/// The external "send a text to this number" capability.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &Identifier, text: &str) -> Result<()>;
}

/// Durable storage for the settings document, read and written as a whole.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Settings>> + Send;
    fn save(&self, settings: &Settings) -> impl std::future::Future<Output = Result<()>> + Send;
}
