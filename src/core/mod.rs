//! Core module - shared infrastructure for Pommel
//!
//! This module contains configuration and error handling used throughout
//! the framework.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{PommelError, Result};
