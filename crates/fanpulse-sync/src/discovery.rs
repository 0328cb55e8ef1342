//! Channel crawl: list every active channel and upsert what it shows.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fanpulse_core::{
    ArtistChannel, ChannelStore, EventStore, StreamLister, StreamingPlatform, SweepResult,
};

use crate::error::SyncError;
use crate::upsert::upsert_stream;

const SWEEP: &str = "discovery";

/// One pass over all active YouTube channels.
///
/// Channels are processed one at a time in query order. A channel whose
/// listing fails is recorded and skipped; a stream whose upsert fails is
/// recorded and skipped. Neither stops the sweep.
pub struct DiscoverySweep {
    channels: Arc<dyn ChannelStore>,
    events: Arc<dyn EventStore>,
    lister: Arc<dyn StreamLister>,
    channel_delay: Duration,
}

impl DiscoverySweep {
    pub fn new(
        channels: Arc<dyn ChannelStore>,
        events: Arc<dyn EventStore>,
        lister: Arc<dyn StreamLister>,
    ) -> Self {
        Self {
            channels,
            events,
            lister,
            channel_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive channels. Not applied after the last one.
    #[must_use]
    pub fn with_channel_delay(mut self, delay: Duration) -> Self {
        self.channel_delay = delay;
        self
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Store`] only if the channel list cannot be
    /// loaded; everything after that is counted in the result.
    pub async fn run(&self) -> Result<SweepResult, SyncError> {
        let started = tokio::time::Instant::now();
        let mut channels = self
            .channels
            .list_active_channels(StreamingPlatform::YouTube)
            .await?;

        tracing::info!(channels = channels.len(), "discovery: sweep starting");

        let mut result = SweepResult::new();
        for (index, channel) in channels.iter_mut().enumerate() {
            if index > 0 && !self.channel_delay.is_zero() {
                tokio::time::sleep(self.channel_delay).await;
            }
            self.discover_channel(channel, &mut result).await;
        }

        crate::log_sweep_summary(SWEEP, &result, started.elapsed());
        Ok(result)
    }

    async fn discover_channel(&self, channel: &mut ArtistChannel, result: &mut SweepResult) {
        let handle = channel.channel_handle.clone();

        let streams = match self.lister.list(&handle).await {
            Ok(streams) => streams,
            Err(e) => {
                tracing::error!(channel = %handle, error = %e, "discovery: channel listing failed");
                result.record_channel_failure(&handle, &e.to_string());
                return;
            }
        };

        tracing::debug!(channel = %handle, streams = streams.len(), "discovery: channel listed");
        result.total += streams.len();

        for stream in &streams {
            match upsert_stream(self.events.as_ref(), channel.artist_id, stream, Utc::now()).await {
                Ok(outcome) => result.record_upsert(outcome),
                Err(e) => {
                    tracing::error!(
                        channel = %handle,
                        external_id = %stream.external_id,
                        error = %e,
                        "discovery: stream upsert failed"
                    );
                    result.record_failure(format!(
                        "channel={handle}, external_id={}, error={e}",
                        stream.external_id
                    ));
                }
            }
        }

        let now = Utc::now();
        channel.mark_crawled(now);
        if let Err(e) = self.channels.mark_crawled(channel.id, now).await {
            tracing::warn!(
                channel = %handle,
                error = %e,
                "discovery: failed to mark channel crawled"
            );
            result.push_error(format!("channel={handle}, error=mark crawled failed: {e}"));
        }
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
