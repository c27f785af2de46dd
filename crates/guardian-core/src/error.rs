//! Error types for guardian-core.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = GuardianError> = std::result::Result<T, E>;

/// Errors that can occur while driving the page runtime.
#[derive(Debug, Error)]
pub enum GuardianError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A displayed statistic is not a non-negative integer.
    #[error("Statistic value {text:?} is not a non-negative integer")]
    UnparsableStatistic {
        /// Text as it was displayed.
        text: String,
    },

    /// A required element is absent from the page.
    #[error("Element not found: {0}")]
    MissingElement(String),

    /// The host (browser) rejected an operation.
    #[error("Host error: {0}")]
    Host(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A field holds a value outside its allowed range.
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
