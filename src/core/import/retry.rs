//! Retry policy for bulk items
//!
//! Decides which statuses are transient and how long to wait between
//! resubmissions. The boundary between retryable and rejected is the
//! configured `retryable_statuses` list.

use crate::adapters::store::BulkItemStatus;
use crate::config::RetryConfig;
use crate::domain::{FerryError, ItemOutcome, Result, StoreError};
use std::time::Duration;

/// Bounded exponential backoff with an explicit set of transient statuses
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_delay_ms: u64,
    max_delay_ms: u64,
    backoff_multiplier: f64,
    retryable_statuses: Vec<u16>,
}

impl RetryPolicy {
    /// Build the policy from configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay_ms: config.initial_delay_ms,
            max_delay_ms: config.max_delay_ms,
            backoff_multiplier: config.backoff_multiplier,
            retryable_statuses: config.retryable_statuses.clone(),
        }
    }

    /// Override the number of resubmissions
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Maximum number of resubmissions per chunk
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Delay before resubmission number `attempt` (1-based)
    ///
    /// `initial_delay_ms * multiplier^(attempt - 1)`, capped at
    /// `max_delay_ms`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Whether a status is transient
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Outcome of one item reported by the store
    pub fn classify_item(&self, item: &BulkItemStatus) -> ItemOutcome {
        if item.is_success() {
            return ItemOutcome::Accepted;
        }

        let reason = item
            .reason
            .clone()
            .unwrap_or_else(|| format!("store returned status {}", item.status));

        if self.is_retryable_status(item.status) {
            ItemOutcome::Retryable {
                status: Some(item.status),
                reason,
            }
        } else {
            ItemOutcome::Rejected {
                status: Some(item.status),
                reason,
            }
        }
    }

    /// Outcome shared by every item of a request that failed as a whole
    ///
    /// # Errors
    ///
    /// Refused credentials end the run.
    pub fn classify_request_error(&self, error: StoreError) -> Result<ItemOutcome> {
        if matches!(error, StoreError::Authentication { .. }) {
            return Err(FerryError::Store(error));
        }

        let status = error.status();
        let reason = error.to_string();

        let retryable = error.is_transport()
            || status.map(|s| self.is_retryable_status(s)).unwrap_or(false);

        Ok(if retryable {
            ItemOutcome::Retryable { status, reason }
        } else {
            ItemOutcome::Rejected { status, reason }
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
