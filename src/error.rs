use thiserror::Error;

use crate::config::ConfigurationError;

/// Errors raised by the database setup glue.
///
/// Key conversion never fails and has no variant here.
#[derive(Debug, Error)]
pub enum KeycaseDbError {
    #[error("connection is required")]
    MissingConnection,

    #[error("Could not connect to db: {code}")]
    TransientConnection { code: String },

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl KeycaseDbError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientConnection { .. })
    }
}

pub type Result<T> = std::result::Result<T, KeycaseDbError>;
