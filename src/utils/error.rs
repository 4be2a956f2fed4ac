use crate::domain::session::SessionState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Directory rejected the request: {message}")]
    DirectoryError { message: String },

    #[error("Session unavailable ({state})")]
    SessionUnavailable { state: SessionState },

    #[error("Bridge rejected the API key ({status})")]
    AuthenticationError { status: u16 },

    #[error("Operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Settings storage error: {message}")]
    SettingsError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Directory,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CheckerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckerError::HttpError(_) | CheckerError::Timeout { .. } => ErrorCategory::Network,
            CheckerError::DirectoryError { .. } | CheckerError::SessionUnavailable { .. } => {
                ErrorCategory::Directory
            }
            CheckerError::IoError(_) | CheckerError::SettingsError { .. } => ErrorCategory::Storage,
            CheckerError::CsvError(_) | CheckerError::SerializationError(_) => ErrorCategory::Data,
            CheckerError::ConfigError { .. }
            | CheckerError::ConfigValidationError { .. }
            | CheckerError::InvalidConfigValueError { .. }
            | CheckerError::MissingConfigError { .. }
            | CheckerError::AuthenticationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Directory => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckerError::HttpError(_) => "Could not reach the WhatsApp bridge".to_string(),
            CheckerError::Timeout { millis } => {
                format!("The WhatsApp bridge did not answer within {}ms", millis)
            }
            CheckerError::SessionUnavailable { state } => {
                format!("The WhatsApp session is not usable right now ({})", state)
            }
            CheckerError::DirectoryError { message } => {
                format!("The WhatsApp bridge rejected the request: {}", message)
            }
            CheckerError::AuthenticationError { .. } => {
                "The WhatsApp bridge did not accept the configured API key".to_string()
            }
            CheckerError::SettingsError { message } => {
                format!("Could not save settings: {}", message)
            }
            CheckerError::IoError(e) => format!("File access failed: {}", e),
            CheckerError::CsvError(e) => format!("Could not read the number list: {}", e),
            CheckerError::SerializationError(e) => format!("Malformed data: {}", e),
            CheckerError::ConfigError { .. }
            | CheckerError::ConfigValidationError { .. }
            | CheckerError::InvalidConfigValueError { .. }
            | CheckerError::MissingConfigError { .. } => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the bridge URL is correct and the bridge is running",
            ErrorCategory::Directory => {
                "Re-link the WhatsApp session on the bridge, then run the check again"
            }
            ErrorCategory::Storage => "Make sure the settings file location is writable",
            ErrorCategory::Data => "Verify the input file is a valid CSV with one number per row",
            ErrorCategory::Configuration => "Review the configuration file and command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;
