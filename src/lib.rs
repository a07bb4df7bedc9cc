//! Pommel - Page Object Model browser test framework
//!
//! A Rust test framework that drives real browsers over the W3C WebDriver
//! protocol and captures bounded-history HTML snapshots of every page it
//! visits, so locators can be written and reviewed against the markup that
//! was actually served.
//!
//! # Architecture
//!
//! - **Core**: Configuration and error handling
//! - **Driver**: WebDriver process management and wire client
//! - **Browser**: Auto-waiting interaction helpers and snapshot hooks
//! - **Pages**: Page objects for the storefront demo app
//! - **Snapshot**: HTML snapshot store with per-subject history retention
//!
//! # Usage
//!
//! ```rust,no_run
//! use pommel::{Browser, Config, DriverManager};
//! use pommel::pages::{HomePage, Page};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load();
//!     let driver = DriverManager::launch(&config).await?;
//!     let browser = Browser::new(driver, config);
//!
//!     let home = HomePage::new(&browser);
//!     home.open().await?;
//!     assert!(home.is_loaded().await?);
//!
//!     browser.quit().await;
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod core;
pub mod demo;
pub mod driver;
pub mod pages;
pub mod snapshot;

// Re-export commonly used items
pub use browser::Browser;
pub use core::{Config, PommelError, Result};
pub use driver::{Driver, DriverManager, Locator};
pub use snapshot::SnapshotStore;
