//! Idempotent write of one discovered stream.

use chrono::{DateTime, Utc};
use fanpulse_core::{
    DiscoveredStream, EventStore, StreamingEvent, StreamingStatus, UpsertOutcome,
};
use uuid::Uuid;

use crate::error::SyncError;

/// Inserts `stream` as a new event or refreshes the event it already maps to.
///
/// Lookup is by `(platform, external_id)`, falling back to `stream_url` for
/// rows written before external ids were tracked. Running this twice with
/// the same input updates the row in place; it never creates a duplicate.
///
/// A forward move (`SCHEDULED` to `LIVE`, `LIVE` to `ENDED`) that the listing
/// reports without a timestamp is stamped with `now`.
///
/// # Errors
///
/// Returns [`SyncError::Store`] if a lookup or write fails (including a
/// uniqueness conflict from a concurrent writer) and [`SyncError::Domain`]
/// for a negative viewer count on an existing event.
pub async fn upsert_stream(
    events: &dyn EventStore,
    artist_id: Uuid,
    stream: &DiscoveredStream,
    now: DateTime<Utc>,
) -> Result<UpsertOutcome, SyncError> {
    let existing = match events
        .find_by_external_id(stream.platform, &stream.external_id)
        .await?
    {
        Some(event) => Some(event),
        None => events.find_by_stream_url(&stream.stream_url).await?,
    };

    let Some(mut event) = existing else {
        let event = StreamingEvent::from_discovered(artist_id, stream, now);
        events.insert(&event).await?;
        tracing::debug!(
            event_id = %event.id(),
            external_id = %stream.external_id,
            status = %event.status(),
            "discovery: inserted streaming event"
        );
        return Ok(UpsertOutcome::Inserted);
    };

    if !stream.title.trim().is_empty() {
        event.update_metadata(&stream.title, stream.thumbnail_url.as_deref());
    }
    event.update_description(stream.description.as_deref());
    event.update_source_identity(stream.platform, Some(&stream.external_id));
    event.update_source_url(stream.source_url.as_deref());
    match (event.status(), stream.status) {
        (StreamingStatus::Scheduled, StreamingStatus::Live) if stream.started_at.is_none() => {
            event.go_live(now)?;
        }
        (StreamingStatus::Live, StreamingStatus::Ended) if stream.ended_at.is_none() => {
            event.end(now)?;
        }
        _ => {}
    }
    event.apply_discovery_status(
        stream.status,
        stream.scheduled_at,
        stream.started_at,
        stream.ended_at,
    );
    if let Some(count) = stream.viewer_count {
        event.update_viewer_count(count)?;
    }

    events.save(&event).await?;
    tracing::debug!(
        event_id = %event.id(),
        external_id = %stream.external_id,
        status = %event.status(),
        "discovery: updated streaming event"
    );
    Ok(UpsertOutcome::Updated)
}
