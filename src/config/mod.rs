pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "numcheck")]
#[command(about = "Bulk WhatsApp registration checker")]
pub struct CliConfig {
    /// TOML configuration file; flags below override its values
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[arg(long, global = true, env = "NUMCHECK_BRIDGE_URL")]
    pub bridge_url: Option<String>,

    #[arg(long, global = true, env = "NUMCHECK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true)]
    pub settings_file: Option<String>,

    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true)]
    pub retry_attempts: Option<u32>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Check a comma-separated list of numbers and/or a CSV file
    Check {
        numbers: Option<String>,

        #[arg(long, short = 'f')]
        file: Option<String>,

        /// Do not send the summary to the notification target
        #[arg(long)]
        no_notify: bool,

        /// Print the result as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },
    /// Store the number that receives check summaries
    SetTarget { number: String },
    /// Print the stored notification target
    ShowTarget,
    /// Read `<sender>: <message>` lines from stdin and answer chat commands
    Chat,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and applies command-line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(url) = &self.bridge_url {
            config.directory.base_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.directory.api_key = Some(key.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.directory.timeout_seconds = timeout;
        }
        if let Some(path) = &self.settings_file {
            config.notification.settings_file = path.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(attempts) = self.retry_attempts {
            config.batch.retry_attempts = attempts;
        }

        Ok(config)
    }
}
