//! Per-sweep summary returned by the discovery and refresh sweeps.

use serde::Serialize;

/// Upper bound on error strings kept in one [`SweepResult`].
pub const MAX_RECORDED_ERRORS: usize = 100;

/// Whether an upsert created a row or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Counters and operator-facing error strings for one sweep invocation.
///
/// Built fresh for every run and handed back to the caller; nothing here is
/// process-global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepResult {
    /// Candidates seen: discovered streams, or events targeted by a refresh.
    pub total: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    /// Channels whose listing failed. Each one is also counted in `failed`.
    pub channels_failed: usize,
    pub errors: Vec<String>,
    /// Errors not kept in `errors` because the cap was reached.
    pub errors_dropped: usize,
}

impl SweepResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows inserted plus rows updated.
    #[must_use]
    pub fn upserted(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn record_upsert(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.push_error(message);
    }

    pub fn record_channel_failure(&mut self, handle: &str, message: &str) {
        self.channels_failed += 1;
        self.record_failure(format!("channel={handle}, error={message}"));
    }

    /// Keeps an error string without touching the failure counters.
    pub fn push_error(&mut self, message: impl Into<String>) {
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(message.into());
        } else {
            self.errors_dropped += 1;
        }
    }
}
