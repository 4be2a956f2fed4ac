pub mod checker;
pub mod commands;
pub mod conversation;
pub mod directory;
pub mod normalizer;
pub mod notifier;
pub mod orchestrator;
pub mod summary;

pub use crate::domain::model::{BatchResult, Identifier, LookupOutcome, LookupStatus};
pub use crate::domain::ports::{Directory, Notifier, SettingsStore};
pub use crate::utils::error::Result;
