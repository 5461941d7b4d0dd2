//! Unified error types for finweb

use thiserror::Error;

/// Unified error type for all finweb operations
#[derive(Error, Debug)]
pub enum FinwebError {
    // Wait errors
    #[error("condition \"{condition}\" was not met within {waited_ms} ms")]
    Timeout { condition: String, waited_ms: u64 },

    #[error("element \"{0}\" was not found")]
    ElementNotFound(String),

    // Driver errors
    #[error("unsupported configuration: browser \"{browser}\" with \"{mode}\" execution mode")]
    UnsupportedConfiguration { browser: String, mode: String },

    #[error("driver unavailable: {0}")]
    DriverUnavailable(String),

    #[error("WebDriver error: {0}")]
    Driver(String),

    // Session errors
    #[error("no active scenario in the session context")]
    NoActiveScenario,

    #[error("session error: {0}")]
    Session(String),

    // Reporting errors
    #[error("reporting failure: {0}")]
    Reporting(String),

    // Configuration errors
    #[error("invalid configuration value: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FinwebError {
    /// True for errors a bounded wait produces when its target never showed up.
    ///
    /// Interception policies reinterpret these as "feature not present this
    /// run" rather than test failures.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            FinwebError::Timeout { .. } | FinwebError::ElementNotFound(_)
        )
    }
}

/// Result type alias using FinwebError
pub type Result<T> = std::result::Result<T, FinwebError>;
