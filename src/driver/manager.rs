//! WebDriver process manager
//!
//! Spawns and configures a chromedriver or geckodriver process based on
//! config settings, then opens a session against it. Can also attach to an
//! externally managed WebDriver server.

use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::core::config::BrowserConfig;
use crate::core::{Config, PommelError, Result};
use crate::driver::session::{connect_error, unwrap_wire_value, Driver};

/// Poll interval while waiting for the WebDriver process to come up
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Manages WebDriver creation and configuration
pub struct DriverManager;

impl DriverManager {
    /// Create a driver session according to config settings
    ///
    /// Spawns the WebDriver binary for the configured browser, unless
    /// `[webdriver].url` points at an already-running server.
    pub async fn launch(config: &Config) -> Result<Driver> {
        if let Some(url) = &config.webdriver.url {
            return Self::connect(config, url).await;
        }

        let browser = config.browser.name.to_lowercase();
        let default_binary = match browser.as_str() {
            "chrome" => "chromedriver",
            "firefox" => "geckodriver",
            other => return Err(PommelError::UnsupportedBrowser(other.to_string())),
        };
        let binary = config
            .webdriver
            .binary
            .clone()
            .unwrap_or_else(|| default_binary.to_string());

        let port = if config.webdriver.port != 0 {
            config.webdriver.port
        } else {
            rand::rng().random_range(20000..40000)
        };

        debug!(%binary, port, "starting webdriver process");
        let mut child = Command::new(&binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PommelError::WebDriverNotFound(binary.clone())
                } else {
                    PommelError::driver(format!("Failed to start {}: {}", binary, e))
                }
            })?;

        let base_url = format!("http://127.0.0.1:{}", port);
        let client = http_client(config)?;

        let startup = Duration::from_secs(config.webdriver.startup_timeout_secs);
        if let Err(e) = wait_until_ready(&client, &base_url, startup, &mut child).await {
            stop(&mut child).await;
            return Err(e);
        }

        match open_session(&client, &base_url, &config.browser, &browser).await {
            Ok(session_id) => {
                let driver = Driver::new(client, base_url, session_id, Some(child));
                driver
                    .set_timeouts(
                        config.browser.page_load_timeout(),
                        config.browser.implicit_wait(),
                    )
                    .await?;
                Ok(driver)
            }
            Err(e) => {
                stop(&mut child).await;
                Err(e)
            }
        }
    }

    /// Attach to an already-running WebDriver server
    pub async fn connect(config: &Config, url: &str) -> Result<Driver> {
        let base_url = url.trim_end_matches('/').to_string();
        let client = http_client(config)?;

        // Fail fast with a useful message if nothing is listening
        status(&client, &base_url).await?;

        let browser = config.browser.name.to_lowercase();
        let session_id = open_session(&client, &base_url, &config.browser, &browser).await?;
        let driver = Driver::new(client, base_url, session_id, None);
        driver
            .set_timeouts(
                config.browser.page_load_timeout(),
                config.browser.implicit_wait(),
            )
            .await?;
        Ok(driver)
    }
}

fn http_client(config: &Config) -> Result<Client> {
    // Page loads block on the wire, so the HTTP timeout has to outlast them
    let timeout = config.browser.page_load_timeout() + Duration::from_secs(30);
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PommelError::driver(format!("Failed to create HTTP client: {}", e)))
}

/// Query the server's /status endpoint
async fn status(client: &Client, base_url: &str) -> Result<Value> {
    let resp = client
        .get(format!("{}/status", base_url))
        .send()
        .await
        .map_err(|e| connect_error(base_url, e))?;
    unwrap_wire_value(resp).await
}

async fn wait_until_ready(
    client: &Client,
    base_url: &str,
    timeout: Duration,
    child: &mut Child,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(Some(exit)) = child.try_wait() {
            return Err(PommelError::driver(format!(
                "WebDriver process exited during startup ({})",
                exit
            )));
        }
        if status(client, base_url).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(PommelError::timeout(format!(
                "WebDriver at {} not ready after {:?}",
                base_url, timeout
            )));
        }
        sleep(STARTUP_POLL_INTERVAL).await;
    }
}

async fn open_session(
    client: &Client,
    base_url: &str,
    browser: &BrowserConfig,
    kind: &str,
) -> Result<String> {
    let body = json!({ "capabilities": { "alwaysMatch": capabilities(browser, kind) } });
    let resp = client
        .post(format!("{}/session", base_url))
        .json(&body)
        .send()
        .await
        .map_err(|e| connect_error(base_url, e))?;
    let value = unwrap_wire_value(resp).await?;

    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| PommelError::driver("session response missing sessionId"))
}

/// Build W3C capabilities for the configured browser
fn capabilities(browser: &BrowserConfig, kind: &str) -> Value {
    let (width, height) = browser.window_dimensions().unwrap_or((1920, 1080));

    match kind {
        "firefox" => {
            let mut args = vec![
                format!("--width={}", width),
                format!("--height={}", height),
            ];
            if browser.headless {
                args.insert(0, "-headless".to_string());
            }
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args },
            })
        }
        _ => {
            let mut args = vec![
                format!("--window-size={},{}", width, height),
                // Stability flags for containerized and CI environments
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-gpu".to_string(),
            ];
            if browser.headless {
                args.insert(0, "--headless=new".to_string());
            }
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args },
            })
        }
    }
}

async fn stop(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to stop webdriver process");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser_config(headless: bool) -> BrowserConfig {
        BrowserConfig {
            headless,
            ..BrowserConfig::default()
        }
    }

    #[test]
    fn test_chrome_capabilities() {
        let caps = capabilities(&browser_config(true), "chrome");
        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
    }

    #[test]
    fn test_chrome_capabilities_headed() {
        let caps = capabilities(&browser_config(false), "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_firefox_capabilities() {
        let caps = capabilities(&browser_config(true), "firefox");
        assert_eq!(caps["browserName"], "firefox");
        let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert_eq!(args[0], "-headless");
        assert!(args.iter().any(|a| a == "--width=1920"));
    }

    #[tokio::test]
    async fn test_unsupported_browser() {
        let mut config = Config::default();
        config.browser.name = "safari".to_string();
        config.webdriver.url = None;
        let err = DriverManager::launch(&config).await.unwrap_err();
        assert!(matches!(err, PommelError::UnsupportedBrowser(_)));
    }
}
