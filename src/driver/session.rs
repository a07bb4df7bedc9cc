//! WebDriver session client
//!
//! Async HTTP client for an established W3C WebDriver session. Each method
//! maps to one wire endpoint; responses are unwrapped from the standard
//! `{"value": ...}` envelope.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, warn};

use crate::core::{PommelError, Result};
use crate::driver::locator::Locator;

/// W3C element identifier key in wire responses
pub(crate) const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Handle to a located element, valid for the lifetime of the page it was
/// found on
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: String,
}

/// An active WebDriver session
///
/// Owns the spawned WebDriver child process when the session was created by
/// [`DriverManager::launch`](crate::driver::DriverManager::launch). Call
/// [`quit`](Driver::quit) when done; dropping the driver without quitting
/// leaves the process running.
#[derive(Debug)]
pub struct Driver {
    client: Client,
    base_url: String,
    session_id: String,
    child: Option<Child>,
}

impl Driver {
    pub(crate) fn new(
        client: Client,
        base_url: String,
        session_id: String,
        child: Option<Child>,
    ) -> Self {
        Self {
            client,
            base_url,
            session_id,
            child,
        }
    }

    /// The WebDriver server URL this session talks to
    pub fn server_url(&self) -> &str {
        &self.base_url
    }

    /// The wire session id
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn session_url(&self, suffix: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, suffix)
    }

    async fn get(&self, suffix: &str) -> Result<Value> {
        let resp = self
            .client
            .get(self.session_url(suffix))
            .send()
            .await
            .map_err(|e| connect_error(&self.base_url, e))?;
        unwrap_wire_value(resp).await
    }

    async fn post(&self, suffix: &str, body: Value) -> Result<Value> {
        let resp = self
            .client
            .post(self.session_url(suffix))
            .json(&body)
            .send()
            .await
            .map_err(|e| connect_error(&self.base_url, e))?;
        unwrap_wire_value(resp).await
    }

    /// Navigate to a URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    /// Get the current URL
    pub async fn current_url(&self) -> Result<String> {
        let value = self.get("/url").await?;
        as_string(value, "url")
    }

    /// Get the page title
    pub async fn title(&self) -> Result<String> {
        let value = self.get("/title").await?;
        as_string(value, "title")
    }

    /// Get the full HTML source of the current page
    pub async fn page_source(&self) -> Result<String> {
        let value = self.get("/source").await?;
        as_string(value, "page source")
    }

    /// Reload the current page
    pub async fn refresh(&self) -> Result<()> {
        self.post("/refresh", json!({})).await?;
        Ok(())
    }

    /// Find a single element
    pub async fn find(&self, locator: &Locator) -> Result<Element> {
        let body = json!({ "using": locator.using(), "value": locator.value() });
        let value = self.post("/element", body).await.map_err(|e| match e {
            PommelError::ElementNotFound(_) => PommelError::ElementNotFound(locator.to_string()),
            other => other,
        })?;
        extract_element_id(&value)
            .map(|id| Element { id })
            .ok_or_else(|| {
                PommelError::driver(format!("malformed element response for {}", locator))
            })
    }

    /// Find all elements matching the locator
    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>> {
        let body = json!({ "using": locator.using(), "value": locator.value() });
        let value = self.post("/elements", body).await?;
        let items = value
            .as_array()
            .ok_or_else(|| PommelError::driver("malformed elements response"))?;
        Ok(items
            .iter()
            .filter_map(extract_element_id)
            .map(|id| Element { id })
            .collect())
    }

    /// Click an element
    pub async fn click(&self, element: &Element) -> Result<()> {
        self.post(&format!("/element/{}/click", element.id), json!({}))
            .await?;
        Ok(())
    }

    /// Clear an input element
    pub async fn clear(&self, element: &Element) -> Result<()> {
        self.post(&format!("/element/{}/clear", element.id), json!({}))
            .await?;
        Ok(())
    }

    /// Send keystrokes to an element
    pub async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        self.post(
            &format!("/element/{}/value", element.id),
            json!({ "text": text }),
        )
        .await?;
        Ok(())
    }

    /// Get the visible text of an element
    pub async fn text(&self, element: &Element) -> Result<String> {
        let value = self.get(&format!("/element/{}/text", element.id)).await?;
        as_string(value, "element text")
    }

    /// Whether the element is currently displayed
    pub async fn is_displayed(&self, element: &Element) -> Result<bool> {
        let value = self
            .get(&format!("/element/{}/displayed", element.id))
            .await?;
        value
            .as_bool()
            .ok_or_else(|| PommelError::driver("malformed displayed response"))
    }

    /// Execute synchronous JavaScript in the page
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.post("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    /// Take a screenshot of the viewport, returned as PNG bytes
    pub async fn screenshot_png(&self) -> Result<Vec<u8>> {
        let value = self.get("/screenshot").await?;
        let encoded = as_string(value, "screenshot")?;
        BASE64
            .decode(encoded.trim())
            .map_err(|e| PommelError::driver(format!("bad screenshot payload: {}", e)))
    }

    /// Set session timeouts
    pub async fn set_timeouts(&self, page_load: Duration, implicit: Duration) -> Result<()> {
        self.post(
            "/timeouts",
            json!({
                "pageLoad": page_load.as_millis() as u64,
                "implicit": implicit.as_millis() as u64,
            }),
        )
        .await?;
        Ok(())
    }

    /// End the session and stop the WebDriver process if we spawned it
    ///
    /// Errors while tearing down are logged rather than returned; there is
    /// nothing useful a caller can do with them.
    pub async fn quit(mut self) {
        let url = self.session_url("");
        if let Err(e) = self.client.delete(&url).send().await {
            warn!(error = %e, "failed to delete webdriver session");
        }

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to stop webdriver process");
            }
        }
        debug!("webdriver session closed");
    }
}

/// Map a transport-level error, giving connection failures a clearer message
pub(crate) fn connect_error(base_url: &str, e: reqwest::Error) -> PommelError {
    if e.is_connect() {
        PommelError::driver(format!(
            "Cannot connect to WebDriver at {}. Is it running?",
            base_url
        ))
    } else {
        PommelError::from(e)
    }
}

/// Unwrap the `{"value": ...}` envelope, converting wire errors
pub(crate) async fn unwrap_wire_value(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let kind = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("");

    if kind == "no such element" {
        return Err(PommelError::ElementNotFound(message.to_string()));
    }

    Err(PommelError::driver(format!(
        "{} ({}): {}",
        kind, status, message
    )))
}

/// Pull the element id out of a wire element object
pub(crate) fn extract_element_id(value: &Value) -> Option<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

fn as_string(value: Value, what: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(PommelError::driver(format!(
            "expected string {}, got {}",
            what, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_element_id() {
        let value = json!({ ELEMENT_KEY: "abc-123" });
        assert_eq!(extract_element_id(&value), Some("abc-123".to_string()));
        assert_eq!(extract_element_id(&json!({})), None);
        assert_eq!(extract_element_id(&json!("not an object")), None);
    }

    #[test]
    fn test_as_string() {
        assert_eq!(as_string(json!("ok"), "x").unwrap(), "ok");
        assert!(as_string(json!(42), "x").is_err());
    }
}
