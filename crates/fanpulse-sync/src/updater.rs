//! Metadata refresh for a single event.

use std::sync::Arc;

use chrono::Utc;
use fanpulse_core::{ChangeNotifier, EventStore, MetadataChanged, MetadataSource, StreamingEvent};
use fanpulse_youtube::extract_video_id;

use crate::error::SyncError;

/// Fetches fresh metadata for one event, persists it and announces changes.
#[derive(Clone)]
pub struct MetadataUpdateUnit {
    events: Arc<dyn EventStore>,
    source: Arc<dyn MetadataSource>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl MetadataUpdateUnit {
    pub fn new(
        events: Arc<dyn EventStore>,
        source: Arc<dyn MetadataSource>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            events,
            source,
            notifier,
        }
    }

    /// Refreshes `event` in place.
    ///
    /// Returns `Ok(false)` without touching storage when no video id can be
    /// read from the stream URL or the provider has nothing for it. On
    /// success the event is saved and, only if its title or thumbnail
    /// actually changed, a [`MetadataChanged`] is published.
    ///
    /// # Errors
    ///
    /// [`SyncError::Store`] if the save fails, [`SyncError::Notify`] if the
    /// change cannot be published.
    pub async fn update(&self, event: &mut StreamingEvent) -> Result<bool, SyncError> {
        let Some(video_id) = extract_video_id(event.stream_url()) else {
            tracing::debug!(
                event_id = %event.id(),
                stream_url = event.stream_url(),
                "refresh: no video id in stream url"
            );
            return Ok(false);
        };

        let Some(metadata) = self.source.fetch(&video_id).await else {
            return Ok(false);
        };

        let previous_title = event.title().to_owned();
        let previous_thumbnail_url = event.thumbnail_url().map(str::to_owned);

        event.update_metadata(&metadata.title, metadata.thumbnail_url.as_deref());
        self.events.save(event).await?;

        let change = MetadataChanged {
            event_id: event.id(),
            previous_title,
            new_title: event.title().to_owned(),
            previous_thumbnail_url,
            new_thumbnail_url: event.thumbnail_url().map(str::to_owned),
            occurred_at: Utc::now(),
        };
        if change.has_changes() {
            self.notifier.publish(&change).await?;
        }

        Ok(true)
    }
}
