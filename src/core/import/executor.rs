//! Bulk submission of one chunk, including its retries
//!
//! A chunk is resolved completely before this returns: every entry ends up
//! accepted or rejected. Retryable entries are resubmitted on their own, in
//! a smaller request, until the retry budget runs out.

use super::retry::RetryPolicy;
use crate::adapters::store::DocumentStore;
use crate::core::envelope::{bulk_body, BulkEntry};
use crate::core::summary::ChunkResult;
use crate::domain::{ItemFailure, ItemOutcome, Result};
use std::sync::Arc;

/// Submits bulk entries to the store
pub struct BulkExecutor {
    store: Arc<dyn DocumentStore>,
    index: String,
    pipeline: Option<String>,
    policy: RetryPolicy,
}

impl BulkExecutor {
    /// Create an executor for one target index
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index: impl Into<String>,
        pipeline: Option<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            index: index.into(),
            pipeline,
            policy,
        }
    }

    /// Submit `entries` and resolve every one of them
    ///
    /// # Errors
    ///
    /// Only run-level failures (refused credentials) are returned as errors.
    /// Everything else ends up in the [`ChunkResult`].
    pub async fn submit(&self, entries: Vec<BulkEntry>) -> Result<ChunkResult> {
        let mut result = ChunkResult::new();
        let mut pending = entries;
        let mut attempt = 0;

        while !pending.is_empty() {
            let outcomes = self.attempt(&pending).await?;

            let mut retry = Vec::new();
            let mut last_reason = String::new();
            for (entry, outcome) in pending.into_iter().zip(outcomes) {
                match outcome {
                    ItemOutcome::Accepted => result.add_success(entry.ordinals.len()),
                    ItemOutcome::Rejected { status, reason } => {
                        reject(&mut result, &entry, status, &reason)
                    }
                    ItemOutcome::Retryable { status, reason } => {
                        last_reason = reason.clone();
                        retry.push((entry, status, reason));
                    }
                }
            }

            if retry.is_empty() {
                break;
            }

            if attempt >= self.policy.max_retries() {
                tracing::warn!(
                    entries = retry.len(),
                    retries = attempt,
                    "Retries exhausted, rejecting remaining items"
                );
                for (entry, status, reason) in retry {
                    let reason = format!("retries exhausted: {reason}");
                    reject(&mut result, &entry, status, &reason);
                }
                break;
            }

            attempt += 1;
            result.retries += 1;
            let delay = self.policy.delay_for(attempt);
            crate::log_retry_attempt!(attempt, self.policy.max_retries(), last_reason.as_str());
            tracing::debug!(
                entries = retry.len(),
                delay_ms = delay.as_millis() as u64,
                "Resubmitting retryable items"
            );
            tokio::time::sleep(delay).await;

            pending = retry.into_iter().map(|(entry, _, _)| entry).collect();
        }

        Ok(result)
    }

    /// One bulk request; returns exactly one outcome per entry
    async fn attempt(&self, entries: &[BulkEntry]) -> Result<Vec<ItemOutcome>> {
        let body = bulk_body(entries);

        match self
            .store
            .bulk(&self.index, self.pipeline.as_deref(), body)
            .await
        {
            Ok(items) if items.len() == entries.len() => Ok(items
                .iter()
                .map(|item| self.policy.classify_item(item))
                .collect()),
            Ok(items) => {
                tracing::error!(
                    sent = entries.len(),
                    reported = items.len(),
                    "Bulk response item count does not match the request"
                );
                let outcome = ItemOutcome::rejected(format!(
                    "item count mismatch: sent {}, store reported {}",
                    entries.len(),
                    items.len()
                ));
                Ok(vec![outcome; entries.len()])
            }
            Err(e) => {
                tracing::warn!(error = %e, entries = entries.len(), "Bulk request failed");
                let outcome = self.policy.classify_request_error(e)?;
                Ok(vec![outcome; entries.len()])
            }
        }
    }
}

fn reject(result: &mut ChunkResult, entry: &BulkEntry, status: Option<u16>, reason: &str) {
    for ordinal in &entry.ordinals {
        result.add_failure(ItemFailure::new(*ordinal, reason).with_status(status));
    }
}
