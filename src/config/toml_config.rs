use crate::config::settings::DEFAULT_SETTINGS_FILE;
use crate::core::conversation::MAX_CONVERSATION_TTL;
use crate::core::orchestrator::BatchPolicy;
use crate::utils::error::{CheckerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub directory: DirectoryConfig,
    pub batch: BatchConfig,
    pub notification: NotificationConfig,
    pub conversation: ConversationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    /// Ask the bridge for its connection state before the first lookup.
    pub probe_session: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            api_key: None,
            timeout_seconds: 15,
            probe_session: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub concurrency: usize,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub deadline_seconds: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            retry_attempts: 0,
            retry_delay_ms: 500,
            deadline_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub settings_file: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settings_file: DEFAULT_SETTINGS_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub ttl_seconds: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CheckerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CheckerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BRIDGE_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CheckerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy {
            concurrency: self.batch.concurrency,
            retry_attempts: self.batch.retry_attempts,
            retry_delay: Duration::from_millis(self.batch.retry_delay_ms),
            deadline: self.batch.deadline_seconds.map(Duration::from_secs),
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.directory.timeout_seconds)
    }

    pub fn conversation_ttl(&self) -> Duration {
        Duration::from_secs(self.conversation.ttl_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("directory.base_url", &self.directory.base_url)?;
        validation::validate_range("directory.timeout_seconds", self.directory.timeout_seconds, 1, 300)?;
        if let Some(key) = &self.directory.api_key {
            validation::validate_non_empty_string("directory.api_key", key)?;
        }

        validation::validate_range("batch.concurrency", self.batch.concurrency, 1, 64)?;
        validation::validate_range("batch.retry_attempts", self.batch.retry_attempts, 0, 10)?;
        if let Some(deadline) = self.batch.deadline_seconds {
            validation::validate_range("batch.deadline_seconds", deadline, 1, 86_400)?;
        }

        validation::validate_path("notification.settings_file", &self.notification.settings_file)?;
        validation::validate_range(
            "conversation.ttl_seconds",
            self.conversation.ttl_seconds,
            1,
            MAX_CONVERSATION_TTL.as_secs(),
        )?;

        Ok(())
    }
}
