//! Codelens Core - Core data structures, configuration and error handling
//!
//! This module defines the shared data model and ambient infrastructure for the repository
//! profiling pipeline

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
