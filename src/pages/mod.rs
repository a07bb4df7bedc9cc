//! Pages module - Page Object Model layer
//!
//! Each page object owns the locators for one page of the application under
//! test and exposes intent-level methods over them. The example pages target
//! the storefront demo app the integration tests run against.

pub mod home;
pub mod login;

pub use home::HomePage;
pub use login::LoginPage;

use async_trait::async_trait;

use crate::browser::Browser;
use crate::core::Result;

/// Common interface for page objects
#[async_trait]
pub trait Page {
    /// Name of this page, used as the snapshot subject
    fn name(&self) -> &'static str;

    /// The browser this page drives
    fn browser(&self) -> &Browser;

    /// Whether the page's identifying content is present
    async fn is_loaded(&self) -> Result<bool>;

    /// Capture an HTML snapshot of this page under its subject name
    async fn capture(&self) {
        self.browser().capture_snapshot(self.name()).await;
    }
}
