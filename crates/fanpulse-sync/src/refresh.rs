//! Periodic metadata refresh over stored events.

use std::sync::Arc;
use std::time::Duration;

use fanpulse_core::{EventStore, StreamingEvent, StreamingStatus, SweepResult};
use uuid::Uuid;

use crate::error::SyncError;
use crate::updater::MetadataUpdateUnit;

const DEFAULT_BATCH_SIZE: usize = 50;
const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1_000);

/// Re-reads title and thumbnail for stored events, pausing between batches
/// to stay under provider rate limits.
pub struct MetadataRefreshSweep {
    events: Arc<dyn EventStore>,
    updater: MetadataUpdateUnit,
    batch_size: usize,
    batch_delay: Duration,
}

impl MetadataRefreshSweep {
    pub fn new(events: Arc<dyn EventStore>, updater: MetadataUpdateUnit) -> Self {
        Self {
            events,
            updater,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// A zero `batch_size` is treated as one.
    #[must_use]
    pub fn with_batching(mut self, batch_size: usize, batch_delay: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_delay = batch_delay;
        self
    }

    /// Refreshes every `LIVE` event.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] only if the event list cannot be loaded;
    /// per-event failures are counted in the result.
    pub async fn refresh_live(&self) -> Result<SweepResult, SyncError> {
        let events = self.events.list_by_status(StreamingStatus::Live).await?;
        Ok(self.refresh_all("refresh-live", events).await)
    }

    /// Refreshes every event that has not ended.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] only if the event list cannot be loaded;
    /// per-event failures are counted in the result.
    pub async fn refresh_active(&self) -> Result<SweepResult, SyncError> {
        let events = self
            .events
            .list_by_status_not(StreamingStatus::Ended)
            .await?;
        Ok(self.refresh_all("refresh-active", events).await)
    }

    /// Refreshes one event. `Ok(false)` when the id is unknown or nothing
    /// could be fetched.
    ///
    /// # Errors
    ///
    /// Propagates lookup, save and notification failures.
    pub async fn refresh_event(&self, id: Uuid) -> Result<bool, SyncError> {
        let Some(mut event) = self.events.find_by_id(id).await? else {
            tracing::info!(event_id = %id, "refresh: event not found");
            return Ok(false);
        };
        self.updater.update(&mut event).await
    }

    async fn refresh_all(&self, sweep: &'static str, events: Vec<StreamingEvent>) -> SweepResult {
        let started = tokio::time::Instant::now();
        let mut result = SweepResult::new();
        result.total = events.len();
        tracing::info!(sweep, events = result.total, "{sweep}: sweep starting");

        for (index, mut event) in events.into_iter().enumerate() {
            let event_id = event.id();
            match self.updater.update(&mut event).await {
                Ok(true) => result.record_updated(),
                Ok(false) => {
                    tracing::debug!(sweep, event_id = %event_id, "{sweep}: nothing to update");
                    result.record_failure(format!(
                        "event={event_id}, error=could not refresh metadata"
                    ));
                }
                Err(e) => {
                    tracing::error!(
                        sweep,
                        event_id = %event_id,
                        error = %e,
                        "{sweep}: update failed"
                    );
                    result.record_failure(format!("event={event_id}, error={e}"));
                }
            }

            let processed = index + 1;
            if processed % self.batch_size == 0 && processed < result.total {
                tracing::debug!(
                    sweep,
                    processed,
                    delay_ms = u64::try_from(self.batch_delay.as_millis()).unwrap_or(u64::MAX),
                    "{sweep}: batch complete, pausing"
                );
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        crate::log_sweep_summary(sweep, &result, started.elapsed());
        result
    }
}
