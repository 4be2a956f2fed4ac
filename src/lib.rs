pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliCommand, CliConfig};

pub use adapters::http::BridgeClient;
pub use app::{bootstrap, App};
pub use config::settings::{JsonFileSettingsStore, TargetSettings};
pub use config::toml_config::TomlConfig;
pub use core::checker::{CheckReport, CheckService, Delivery, JsonReport};
pub use core::orchestrator::{BatchOrchestrator, BatchPolicy};
pub use utils::error::{CheckerError, Result};
