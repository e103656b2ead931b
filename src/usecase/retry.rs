use std::{
    future::Future,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, warn};

use crate::{config::TransactionConfig, domain::error::DomainError};

/// Re-runs a transaction body while the directory reports write conflicts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(config: TransactionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff,
        }
    }

    pub async fn run<T, F, Fut>(&self, operation: &'static str, body: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        // max_times counts retries, not attempts
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.backoff)
            .with_max_delay(self.backoff * self.max_attempts)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize);

        let retries = AtomicU32::new(0);
        body.retry(backoff)
            .sleep(tokio::time::sleep)
            .when(DomainError::is_conflict)
            .notify(|err: &DomainError, delay: Duration| {
                let attempt = retries.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transaction conflicted, retrying"
                );
            })
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    let attempts = retries.load(Ordering::SeqCst) + 1;
                    warn!(operation, attempts, "transaction kept conflicting, giving up");
                    DomainError::TransientConflict { attempts }
                } else {
                    err
                }
            })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(TransactionConfig::default())
    }
}
