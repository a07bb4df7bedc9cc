//! Driver module - WebDriver process management and wire client
//!
//! Talks the W3C WebDriver protocol over HTTP to a chromedriver or
//! geckodriver process, spawned locally or reached at a configured URL.

pub mod locator;
pub mod manager;
pub mod session;

pub use locator::Locator;
pub use manager::DriverManager;
pub use session::{Driver, Element};
