#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Keycase DB
//!
//! Key-case conversion for JSON values plus the PostgreSQL glue that applies it
//! at the database boundary.
//!
//! ## Overview
//!
//! Database columns are `snake_case`; application code is `camelCase`. This
//! crate converts object keys between the two and wires the conversion into
//! query results and identifiers, with a bounded cache so hot keys are only
//! converted once.
//!
//! ## Module Organization
//!
//! - [`case`] - String case conversion (`camel_case`, `decamelize`)
//! - [`keys`] - Recursive key conversion over JSON values with caching
//! - [`database`] - Client config, query timing, metrics and migrations
//! - [`config`] - Layered settings (file + environment)
//! - [`logging`] - Structured logging initialisation
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use keycase_db::keys::{camelcase_keys, KeyCaseOptions};
//! use serde_json::json;
//!
//! let input = json!({ "user_id": 1, "profile": { "display_name": "Ada" } });
//! let output = camelcase_keys(&input, &KeyCaseOptions::default().deep(true));
//!
//! assert_eq!(output, json!({ "userId": 1, "profile": { "displayName": "Ada" } }));
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod case;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod keys;
pub mod logging;

pub use case::{camel_case, decamelize, CamelCaseOptions, DecamelizeOptions};
pub use config::{ConfigurationError, DatabaseSettings, PoolSettings};
pub use database::{Connection, Database, DatabaseConfig, DatabaseMetrics, MigrationBatch};
pub use error::{KeycaseDbError, Result};
pub use keys::{camelcase_keys, KeyCaseOptions, KeyCaseTransformer, KeyMatcher, StopPath};
