//! Poll loop: fetches statuses, reports changes, reports errors once

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::CycleError;
use crate::notifier::Notifier;
use crate::status_client::StatusClient;
use crate::tracker::{BatchSeen, ChangeTracker};
use crate::verdict::{status_change_message, VerdictMap};

/// How a single poll cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Records were fetched and every reportable change was attempted
    Processed {
        records: usize,
        notified: usize,
        failed: usize,
    },
    /// The cycle was aborted by an error
    Backoff { message: String, notified: bool },
}

/// Drives the poll-detect-notify cycle. Owns all mutable state of the
/// service, so exactly one cycle runs at a time.
#[derive(Debug)]
pub struct PollLoop {
    client: StatusClient,
    verdicts: VerdictMap,
    notifier: Notifier,
    tracker: ChangeTracker,
    last_error: Option<String>,
    last_timestamp: i64,
    interval: Duration,
    cancel: CancellationToken,
}

impl PollLoop {
    pub fn new(
        client: StatusClient,
        verdicts: VerdictMap,
        notifier: Notifier,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            verdicts,
            notifier,
            tracker: ChangeTracker::new(),
            last_error: None,
            last_timestamp: 0,
            interval,
            cancel,
        }
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// `from_date` that the next poll will send
    pub fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    /// Most recent error text that was delivered
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Poll every `interval` until the cancellation token fires
    pub async fn run(&mut self) {
        tracing::info!(
            "Polling {} every {:?}",
            self.client.endpoint(),
            self.interval
        );
        let cancel = self.cancel.clone();

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.run_cycle() => outcome,
            };
            tracing::debug!("Cycle finished: {:?}", outcome);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::debug!("Polling loop cancelled");
    }

    /// Run one cycle: poll, then either process the records or back off
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll_and_process().await {
            Ok(outcome) => outcome,
            Err(error) => self.backoff(&error).await,
        }
    }

    async fn poll_and_process(&mut self) -> Result<CycleOutcome, CycleError> {
        let records = self.client.fetch(self.last_timestamp).await?;
        if records.is_empty() {
            tracing::debug!("No status updates since {}", self.last_timestamp);
        }

        let mut batch = BatchSeen::default();
        let mut settled_max: Option<i64> = None;
        let mut failed_min: Option<i64> = None;
        let mut notified = 0;
        let mut failed = 0;

        for record in &records {
            if !batch.first_sighting(&record.identifier) {
                tracing::debug!(
                    "Skipping duplicate record for '{}' in this batch",
                    record.identifier
                );
                settled_max = settled_max.max(Some(record.updated_at));
                continue;
            }

            let verdict = self
                .verdicts
                .resolve(&record.identifier, &record.status)?;

            if !self.tracker.observe(&record.identifier, &record.status) {
                tracing::debug!(
                    "Status of '{}' unchanged ({})",
                    record.identifier,
                    record.status
                );
                settled_max = settled_max.max(Some(record.updated_at));
                continue;
            }

            let message = status_change_message(&record.identifier, verdict);
            match self.notifier.notify(&message).await {
                Ok(()) => {
                    self.tracker.commit(&record.identifier, &record.status);
                    settled_max = settled_max.max(Some(record.updated_at));
                    notified += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Status change of '{}' will be retried next cycle: {}",
                        record.identifier,
                        e
                    );
                    failed_min = Some(failed_min.map_or(record.updated_at, |m| {
                        m.min(record.updated_at)
                    }));
                    failed += 1;
                }
            }
        }

        let next = next_timestamp(self.last_timestamp, settled_max, failed_min);
        if next != self.last_timestamp {
            tracing::debug!("from_date advanced {} -> {}", self.last_timestamp, next);
        }
        self.last_timestamp = next;

        Ok(CycleOutcome::Processed {
            records: records.len(),
            notified,
            failed,
        })
    }

    async fn backoff(&mut self, error: &CycleError) -> CycleOutcome {
        let message = error_message(error);
        tracing::error!("{}", message);

        if self.last_error.as_deref() == Some(message.as_str()) {
            tracing::debug!("Error already reported, not sending it again");
            return CycleOutcome::Backoff {
                message,
                notified: false,
            };
        }

        let notified = self.notifier.notify(&message).await.is_ok();
        if notified {
            self.last_error = Some(message.clone());
        }
        CycleOutcome::Backoff { message, notified }
    }
}

/// Text reported to the chat when a cycle fails
pub fn error_message(error: &CycleError) -> String {
    format!("Произошла ошибка: {}", error)
}

/// Next `from_date`: the newest settled record, but never at or past a
/// record whose report failed, and never backwards.
pub fn next_timestamp(current: i64, settled_max: Option<i64>, failed_min: Option<i64>) -> i64 {
    let target = match (settled_max, failed_min) {
        (settled, Some(failed)) => settled.unwrap_or(current).min(failed.saturating_sub(1)),
        (Some(settled), None) => settled,
        (None, None) => current,
    };
    current.max(target)
}
