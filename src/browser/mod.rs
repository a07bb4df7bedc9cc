//! Browser module - high-level page interaction
//!
//! Wraps a [`Driver`] session with auto-waiting interaction helpers and the
//! HTML snapshot hooks page objects rely on.

use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::warn;
use url::Url;

use crate::core::{Config, PommelError, Result};
use crate::driver::{Driver, Element, Locator};
use crate::snapshot::SnapshotStore;

/// Poll interval for element waits
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// High-level browser handle shared by page objects
///
/// Every interaction method waits for its target element first, so callers
/// never race page rendering. Navigation methods capture an HTML snapshot
/// when snapshots are enabled in config.
pub struct Browser {
    driver: Driver,
    store: SnapshotStore,
    config: Config,
}

impl Browser {
    /// Wrap a driver session with the given configuration
    pub fn new(driver: Driver, config: Config) -> Self {
        let store = SnapshotStore::from_config(&config);
        Self {
            driver,
            store,
            config,
        }
    }

    /// The underlying driver session
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// The snapshot store this browser captures into
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.store
    }

    /// The configuration this browser was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a path against the configured base URL
    pub fn base_join(&self, path: &str) -> Result<String> {
        let base = Url::parse(&self.config.test_data.base_url)?;
        Ok(base.join(path)?.to_string())
    }

    /// Navigate to a URL and capture the page HTML under `subject`
    pub async fn open(&self, url: &str, subject: &str) -> Result<()> {
        self.driver.goto(url).await?;
        self.capture_snapshot(subject).await;
        Ok(())
    }

    /// Navigate to the configured base URL and capture under `subject`
    pub async fn open_base(&self, subject: &str) -> Result<()> {
        let url = self.config.test_data.base_url.clone();
        self.open(&url, subject).await
    }

    /// Current URL of the page
    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url().await
    }

    /// Title of the page
    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }

    /// Reload the page and re-capture its snapshot
    pub async fn refresh(&self, subject: &str) -> Result<()> {
        self.driver.refresh().await?;
        self.capture_snapshot(subject).await;
        Ok(())
    }

    /// Wait until an element is present, then return it
    pub async fn wait_for(&self, locator: &Locator) -> Result<Element> {
        self.wait_with(locator, self.default_wait(), |_| async { Result::Ok(true) })
            .await
    }

    /// Wait until an element is present and displayed, then return it
    pub async fn wait_until_visible(&self, locator: &Locator) -> Result<Element> {
        let driver = &self.driver;
        self.wait_with(locator, self.default_wait(), |element| async move {
            driver.is_displayed(&element).await
        })
        .await
    }

    /// Check whether an element becomes visible within the timeout
    ///
    /// Unlike the wait methods this never errors; absence is a normal answer.
    pub async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or_else(|| self.default_wait());
        let driver = &self.driver;
        self.wait_with(locator, timeout, |element| async move {
            driver.is_displayed(&element).await
        })
        .await
        .is_ok()
    }

    /// Click an element once it is visible
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self.wait_until_visible(locator).await?;
        self.driver.click(&element).await
    }

    /// Clear an input and type into it once it is visible
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.wait_until_visible(locator).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await
    }

    /// Read the visible text of an element once it is visible
    pub async fn text(&self, locator: &Locator) -> Result<String> {
        let element = self.wait_until_visible(locator).await?;
        self.driver.text(&element).await
    }

    /// Capture the current page HTML under the given subject name
    ///
    /// Best-effort like the store itself: a page whose source cannot be read
    /// loses its snapshot, nothing more.
    pub async fn capture_snapshot(&self, subject: &str) {
        self.capture_snapshot_with(subject, self.config.snapshots.keep_history)
            .await;
    }

    /// Capture with an explicit history retention count
    pub async fn capture_snapshot_with(&self, subject: &str, retention: usize) {
        if !self.config.snapshots.enabled {
            return;
        }
        match self.driver.page_source().await {
            Ok(html) => self.store.capture(subject, &html, retention),
            Err(e) => warn!(subject, error = %e, "could not read page source for snapshot"),
        }
    }

    /// Save a screenshot under the configured screenshots directory
    ///
    /// With no name, uses `{subject}_{timestamp}`.
    pub async fn screenshot(&self, subject: &str, name: Option<&str>) -> Result<PathBuf> {
        let dir = PathBuf::from(&self.config.snapshots.screenshots_dir);
        fs::create_dir_all(&dir)?;

        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{}_{}", subject, Local::now().format("%Y%m%d_%H%M%S")),
        };
        let path = dir.join(format!("{}.png", name));

        let png = self.driver.screenshot_png().await?;
        fs::write(&path, png)?;
        Ok(path)
    }

    /// End the session
    pub async fn quit(self) {
        self.driver.quit().await;
    }

    fn default_wait(&self) -> Duration {
        self.config.browser.implicit_wait()
    }

    /// Poll for an element until `accept` passes or the timeout elapses
    async fn wait_with<F, Fut>(
        &self,
        locator: &Locator,
        timeout: Duration,
        accept: F,
    ) -> Result<Element>
    where
        F: Fn(Element) -> Fut,
        Fut: std::future::Future<Output = Result<bool>>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            match self.driver.find(locator).await {
                Ok(element) => {
                    if accept(element.clone()).await.unwrap_or(false) {
                        return Ok(element);
                    }
                }
                Err(PommelError::ElementNotFound(_)) => {}
                // Transport failures will not heal by polling
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(PommelError::timeout(format!(
                    "element {} not ready after {:?}",
                    locator, timeout
                )));
            }
            sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const STUB_PAGE: &str = "<html><body>stub page</body></html>";

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Minimal in-process WebDriver endpoint: every command succeeds and
    /// page source always returns the stub page
    async fn spawn_stub_webdriver() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut pending: Vec<u8> = Vec::new();
                    let mut buf = [0u8; 4096];
                    loop {
                        // Buffer one full request (headers plus body)
                        let (head, total) = loop {
                            if let Some(end) = header_end(&pending) {
                                let head = String::from_utf8_lossy(&pending[..end]).into_owned();
                                let total = end + 4 + content_length(&head);
                                if pending.len() >= total {
                                    break (head, total);
                                }
                            }
                            match sock.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => pending.extend_from_slice(&buf[..n]),
                            }
                        };
                        pending.drain(..total);

                        let body = if head.starts_with("GET") && head.contains("/source") {
                            format!(
                                "{{\"value\":{}}}",
                                serde_json::to_string(STUB_PAGE).unwrap()
                            )
                        } else {
                            "{\"value\":null}".to_string()
                        };
                        let resp = format!(
                            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        if sock.write_all(resp.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        format!("http://{}", addr)
    }

    async fn stub_browser(config: Config) -> Browser {
        let server = spawn_stub_webdriver().await;
        let driver = Driver::new(
            reqwest::Client::new(),
            server,
            "stub-session".to_string(),
            None,
        );
        Browser::new(driver, config)
    }

    fn test_config(snapshot_dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.snapshots.dir = snapshot_dir.to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn test_open_captures_snapshot() {
        let dir = tempdir().unwrap();
        let browser = stub_browser(test_config(dir.path())).await;

        browser
            .open("http://localhost/home", "HomePage")
            .await
            .unwrap();

        let live = browser.snapshots().read_live("HomePage").unwrap();
        assert_eq!(live.unwrap(), STUB_PAGE);
        assert_eq!(browser.snapshots().history("HomePage").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_base_captures_snapshot() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.test_data.base_url = "http://localhost/".to_string();
        let browser = stub_browser(config).await;

        browser.open_base("HomePage").await.unwrap();

        assert!(browser
            .snapshots()
            .read_live("HomePage")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_open_skips_capture_when_disabled() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.snapshots.enabled = false;
        let browser = stub_browser(config).await;

        browser
            .open("http://localhost/home", "HomePage")
            .await
            .unwrap();

        assert!(browser.snapshots().read_live("HomePage").unwrap().is_none());
    }
}
