use async_trait::async_trait;
use keycase_db::database::{MigrationBatch, MigrationTarget};
use keycase_db::{KeycaseDbError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What an attempt after the scripted failures does
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Succeed,
    FailFatally,
}

/// In-memory migration target failing transiently a fixed number of times
pub struct MockMigrationTarget {
    transient_failures: usize,
    outcome: Outcome,
    attempts: AtomicUsize,
    applied: Vec<String>,
}

impl MockMigrationTarget {
    pub fn succeeding_after(transient_failures: usize) -> Self {
        Self {
            transient_failures,
            outcome: Outcome::Succeed,
            attempts: AtomicUsize::new(0),
            applied: vec![
                "20240101000000_create_users".to_string(),
                "20240102000000_add_user_profiles".to_string(),
            ],
        }
    }

    pub fn failing_after(transient_failures: usize) -> Self {
        Self {
            outcome: Outcome::FailFatally,
            ..Self::succeeding_after(transient_failures)
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MigrationTarget for MockMigrationTarget {
    async fn migrate_latest(&self) -> Result<MigrationBatch> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.transient_failures {
            let code = if attempt % 2 == 0 { "ECONNREFUSED" } else { "ENOTFOUND" };
            return Err(KeycaseDbError::TransientConnection {
                code: code.to_string(),
            });
        }

        match self.outcome {
            Outcome::Succeed => Ok(MigrationBatch {
                batch: 20240102000000,
                applied: self.applied.clone(),
            }),
            Outcome::FailFatally => Err(KeycaseDbError::Database(sqlx::Error::Protocol(
                "syntax error at or near \"CREAT\"".to_string(),
            ))),
        }
    }
}
