//! Core library for bumpkin.
//!
//! This crate provides the version-bump engine used by the `bumpkin` CLI
//! and any downstream consumers.
//!
//! # Modules
//!
//! - [`bump`] - Bump orchestration (next-version resolution, commit/tag)
//! - [`config`] - Configuration loading, discovery and persistence
//! - [`context`] - Layered render context for templates
//! - [`error`] - Shared error types and result aliases
//! - [`files`] - Multi-file version substitution
//! - [`scm`] - Source-control detection and commit/tag adapter
//! - [`version`] - Component-based version model
//!
//! # Quick Start
//!
//! ```no_run
//! use bumpkin_core::{Config, ConfigLoader};
//! use bumpkin_core::bump::do_bump;
//!
//! let config: Config = ConfigLoader::new()
//!     .with_project_search("/path/to/project")
//!     .load()
//!     .expect("failed to load configuration");
//!
//! let outcome = do_bump(Some("patch"), None, &config, None, false)
//!     .expect("bump failed");
//! println!("{} -> {}", outcome.previous, outcome.new);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod context;

pub mod error;

pub mod files;

pub mod scm;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};
