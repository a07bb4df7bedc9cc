//! Configuration management for Pommel
//!
//! Supports environment variables, config files, and runtime overrides.
//! A `Config` value is built once at startup and passed explicitly to every
//! component that needs it; there is no global configuration state.
//!
//! Config file location: ~/.config/pommel/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{PommelError, Result};

/// Main configuration for Pommel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Browser selection and window settings
    pub browser: BrowserConfig,
    /// WebDriver process settings
    pub webdriver: WebDriverConfig,
    /// HTML snapshot and screenshot settings
    #[serde(default)]
    pub snapshots: SnapshotConfig,
    /// Data used by the example page objects and tests
    #[serde(default)]
    pub test_data: TestDataConfig,
}

/// Browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser to drive: "chrome" or "firefox"
    pub name: String,
    /// Whether to run without a visible window
    pub headless: bool,
    /// Window size as "WIDTHxHEIGHT"
    pub window_size: String,
    /// Implicit wait applied to element lookups, in seconds
    pub implicit_wait_secs: u64,
    /// Page load timeout, in seconds
    pub page_load_timeout_secs: u64,
}

/// WebDriver process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// Path to the WebDriver binary. Defaults to `chromedriver` /
    /// `geckodriver` on PATH when unset.
    pub binary: Option<String>,
    /// Port for the spawned WebDriver process. 0 picks a random high port.
    pub port: u16,
    /// URL of an already-running WebDriver server. When set, no process is
    /// spawned.
    pub url: Option<String>,
    /// How long to wait for the spawned process to accept connections
    pub startup_timeout_secs: u64,
}

/// HTML snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Whether page objects capture HTML snapshots on navigation
    pub enabled: bool,
    /// Directory for live snapshots; history goes in a `history/` subdirectory
    pub dir: String,
    /// How many timestamped history copies to keep per subject
    pub keep_history: usize,
    /// Directory for screenshots
    pub screenshots_dir: String,
}

/// Test data used by the example page objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDataConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Login username for the storefront demo
    pub username: Option<String>,
    /// Login password for the storefront demo
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            webdriver: WebDriverConfig::default(),
            snapshots: SnapshotConfig::default(),
            test_data: TestDataConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            name: env::var("POMMEL_BROWSER").unwrap_or_else(|_| "chrome".to_string()),
            headless: env::var("POMMEL_HEADLESS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            window_size: "1920x1080".to_string(),
            implicit_wait_secs: 10,
            page_load_timeout_secs: 30,
        }
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            binary: env::var("POMMEL_WEBDRIVER_BINARY").ok(),
            port: 0,
            url: env::var("POMMEL_WEBDRIVER_URL").ok(),
            startup_timeout_secs: 10,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("POMMEL_SNAPSHOTS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            dir: "page_snapshots".to_string(),
            keep_history: 2,
            screenshots_dir: "screenshots".to_string(),
        }
    }
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("POMMEL_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/".to_string()),
            username: env::var("POMMEL_USERNAME").ok(),
            password: env::var("POMMEL_PASSWORD").ok(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pommel")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(PommelError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| PommelError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| PommelError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| PommelError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PommelError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| PommelError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save configuration and return the path
    pub fn save_and_get_path(&self) -> Result<PathBuf> {
        self.save()?;
        Ok(Self::config_file())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

impl BrowserConfig {
    /// Parse `window_size` into (width, height)
    pub fn window_dimensions(&self) -> Option<(u32, u32)> {
        let (w, h) = self.window_size.split_once('x')?;
        Some((w.parse().ok()?, h.parse().ok()?))
    }

    /// Implicit wait as a Duration
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    /// Page load timeout as a Duration
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}
