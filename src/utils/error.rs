use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed error codes surfaced in the `code` field of a failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotInstalled,
    InvalidInput,
    ConversionFailed,
    NotInitialized,
    InitFailed,
    ApiKeyMissing,
    RateLimit,
    IndexNotFound,
    QueryFailed,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotInstalled => "NOT_INSTALLED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ConversionFailed => "CONVERSION_FAILED",
            ErrorCode::NotInitialized => "NOT_INITIALIZED",
            ErrorCode::InitFailed => "INIT_FAILED",
            ErrorCode::ApiKeyMissing => "API_KEY_MISSING",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::IndexNotFound => "INDEX_NOT_FOUND",
            ErrorCode::QueryFailed => "QUERY_FAILED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("{0}")]
    NotInstalled(String),

    #[error("Command not found: {program}")]
    CommandNotFound { program: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{0}")]
    ConversionFailed(String),

    #[error("{0}")]
    NotInitialized(String),

    #[error("{0}")]
    InitFailed(String),

    #[error("{0}")]
    ApiKeyMissing(String),

    #[error("{0}")]
    RateLimit(String),

    #[error("{0}")]
    IndexNotFound(String),

    #[error("{0}")]
    QueryFailed(String),

    #[error("Command timed out after {seconds}s: {program}")]
    Timeout { program: String, seconds: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Unknown(String),
}

impl BridgeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::NotInstalled(_) | BridgeError::CommandNotFound { .. } => {
                ErrorCode::NotInstalled
            }
            BridgeError::InvalidInput(_)
            | BridgeError::InvalidConfigValue { .. }
            | BridgeError::ConfigError { .. } => ErrorCode::InvalidInput,
            BridgeError::ConversionFailed(_) => ErrorCode::ConversionFailed,
            BridgeError::NotInitialized(_) => ErrorCode::NotInitialized,
            BridgeError::InitFailed(_) => ErrorCode::InitFailed,
            BridgeError::ApiKeyMissing(_) => ErrorCode::ApiKeyMissing,
            BridgeError::RateLimit(_) => ErrorCode::RateLimit,
            BridgeError::IndexNotFound(_) => ErrorCode::IndexNotFound,
            BridgeError::QueryFailed(_) => ErrorCode::QueryFailed,
            BridgeError::Timeout { .. }
            | BridgeError::IoError(_)
            | BridgeError::SerializationError(_)
            | BridgeError::Unknown(_) => ErrorCode::Unknown,
        }
    }

    /// Folds any failure raised while a conversion is underway into
    /// `CONVERSION_FAILED`, keeping the original text.
    pub fn into_conversion_failure(self) -> Self {
        match self {
            BridgeError::ConversionFailed(_) => self,
            other => BridgeError::ConversionFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
