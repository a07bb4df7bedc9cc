//! Snapshot module - bounded-history persistence of page HTML
//!
//! Captured HTML lets locators be reviewed against the markup that was
//! actually served, without re-running the browser.

pub mod store;

pub use store::SnapshotStore;
