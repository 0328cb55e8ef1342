//! Discovery and metadata refresh sweeps over the storage and YouTube ports.

pub mod discovery;
pub mod error;
pub mod notify;
pub mod refresh;
pub mod updater;
pub mod upsert;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use fanpulse_core::SweepResult;

pub use discovery::DiscoverySweep;
pub use error::SyncError;
pub use notify::{ChannelNotifier, TracingNotifier};
pub use refresh::MetadataRefreshSweep;
pub use updater::MetadataUpdateUnit;
pub use upsert::upsert_stream;

/// Errors logged individually at the end of a sweep; the rest stay in the
/// returned [`SweepResult`].
const LOGGED_ERRORS: usize = 5;

fn log_sweep_summary(sweep: &'static str, result: &SweepResult, elapsed: Duration) {
    #[allow(clippy::cast_possible_truncation)]
    let elapsed_ms = elapsed.as_millis() as u64;
    tracing::info!(
        sweep,
        total = result.total,
        inserted = result.inserted,
        updated = result.updated,
        failed = result.failed,
        channels_failed = result.channels_failed,
        elapsed_ms,
        "{sweep}: sweep finished"
    );
    for error in result.errors.iter().take(LOGGED_ERRORS) {
        tracing::warn!(sweep, error = %error, "{sweep}: sweep error");
    }
}
