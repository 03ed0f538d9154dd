//! mobilectl Core - Shared foundation for the mobilectl release tool
//!
//! This crate provides the error taxonomy and the configuration system
//! (types, defaults, loading and validation) used by the changelog engine
//! and the CLI.

pub mod config;
pub mod error;

pub use error::{ChangelogError, ConfigError, GitError, MobilectlError, Result};
