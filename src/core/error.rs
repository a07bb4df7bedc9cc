//! Custom error types for Pommel
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Pommel operations
#[derive(Error, Debug)]
pub enum PommelError {
    /// WebDriver process or session errors
    #[error("Driver error: {0}")]
    Driver(String),

    /// Element lookup failed
    #[error("No such element: {0}")]
    ElementNotFound(String),

    /// A wait condition did not complete in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot store errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// WebDriver binary not installed
    #[error("'{0}' not found. Install it (e.g. apt install chromium-chromedriver) or set [webdriver].binary in the config")]
    WebDriverNotFound(String),

    /// Browser name in config is not supported
    #[error("Unsupported browser: '{0}'. Supported browsers: chrome, firefox")]
    UnsupportedBrowser(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Pommel operations
pub type Result<T> = std::result::Result<T, PommelError>;

impl PommelError {
    /// Create a driver error
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
