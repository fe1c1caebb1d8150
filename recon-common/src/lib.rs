//! # Recon Common Library
//!
//! Shared code for the reconciliation workspace:
//! - Error types
//! - Configuration file resolution and TOML loading
//! - Logging and HTTP bootstrap settings
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
