//! Database operations for `streaming_events`.

use chrono::{DateTime, Utc};
use fanpulse_core::streaming::StreamingEventParts;
use fanpulse_core::{StreamingEvent, StreamingPlatform, StreamingStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const SELECT_COLUMNS: &str = "SELECT id, artist_id, title, description, platform, external_id, \
     stream_url, source_url, thumbnail_url, scheduled_at, started_at, ended_at, \
     status, viewer_count, created_at, updated_at \
     FROM streaming_events";

/// A row from the `streaming_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StreamingEventRow {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub platform: Option<String>,
    pub external_id: Option<String>,
    pub stream_url: String,
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: String,
    pub viewer_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StreamingEventRow> for StreamingEvent {
    type Error = DbError;

    fn try_from(row: StreamingEventRow) -> Result<Self, Self::Error> {
        let platform = row
            .platform
            .as_deref()
            .map(str::parse::<StreamingPlatform>)
            .transpose()?;
        let status = row.status.parse::<StreamingStatus>()?;

        Ok(StreamingEvent::from_parts(StreamingEventParts {
            id: row.id,
            artist_id: row.artist_id,
            title: row.title,
            description: row.description,
            platform,
            external_id: row.external_id,
            stream_url: row.stream_url,
            source_url: row.source_url,
            thumbnail_url: row.thumbnail_url,
            scheduled_at: row.scheduled_at,
            started_at: row.started_at,
            ended_at: row.ended_at,
            status,
            viewer_count: row.viewer_count,
        }))
    }
}

fn into_events(rows: Vec<StreamingEventRow>) -> Result<Vec<StreamingEvent>, DbError> {
    rows.into_iter().map(StreamingEvent::try_from).collect()
}

/// Fetches one event by primary key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::InvalidRow`] if
/// the stored platform or status is not recognised.
pub async fn get_streaming_event(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<StreamingEvent>, DbError> {
    let row = sqlx::query_as::<_, StreamingEventRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(StreamingEvent::try_from).transpose()
}

/// Fetches the event for an external video on a platform.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::InvalidRow`] on
/// an unreadable row.
pub async fn find_by_platform_external_id(
    pool: &PgPool,
    platform: StreamingPlatform,
    external_id: &str,
) -> Result<Option<StreamingEvent>, DbError> {
    let row = sqlx::query_as::<_, StreamingEventRow>(&format!(
        "{SELECT_COLUMNS} WHERE platform = $1 AND external_id = $2"
    ))
    .bind(platform.as_str())
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    row.map(StreamingEvent::try_from).transpose()
}

/// Fetches an event by its watch URL.
///
/// `stream_url` is not unique; legacy duplicates resolve to the oldest row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::InvalidRow`] on
/// an unreadable row.
pub async fn find_by_stream_url(
    pool: &PgPool,
    stream_url: &str,
) -> Result<Option<StreamingEvent>, DbError> {
    let row = sqlx::query_as::<_, StreamingEventRow>(&format!(
        "{SELECT_COLUMNS} WHERE stream_url = $1 ORDER BY created_at ASC, id ASC LIMIT 1"
    ))
    .bind(stream_url)
    .fetch_optional(pool)
    .await?;

    row.map(StreamingEvent::try_from).transpose()
}

/// Lists events in `status`, earliest `scheduled_at` first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::InvalidRow`] on
/// an unreadable row.
pub async fn list_events_by_status(
    pool: &PgPool,
    status: StreamingStatus,
) -> Result<Vec<StreamingEvent>, DbError> {
    let rows = sqlx::query_as::<_, StreamingEventRow>(&format!(
        "{SELECT_COLUMNS} WHERE status = $1 ORDER BY scheduled_at ASC, id ASC"
    ))
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    into_events(rows)
}

/// Lists events whose status differs from `status`, earliest `scheduled_at`
/// first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::InvalidRow`] on
/// an unreadable row.
pub async fn list_events_by_status_not(
    pool: &PgPool,
    status: StreamingStatus,
) -> Result<Vec<StreamingEvent>, DbError> {
    let rows = sqlx::query_as::<_, StreamingEventRow>(&format!(
        "{SELECT_COLUMNS} WHERE status <> $1 ORDER BY scheduled_at ASC, id ASC"
    ))
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    into_events(rows)
}

/// Inserts a new event row.
///
/// A second row for the same `(platform, external_id)` is rejected by
/// `ux_streaming_events_platform_external_id`; check
/// [`DbError::is_unique_violation`] to detect it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_streaming_event(pool: &PgPool, event: &StreamingEvent) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO streaming_events \
             (id, artist_id, title, description, platform, external_id, stream_url, \
              source_url, thumbnail_url, scheduled_at, started_at, ended_at, status, viewer_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(event.id())
    .bind(event.artist_id())
    .bind(event.title())
    .bind(event.description())
    .bind(event.platform().map(StreamingPlatform::as_str))
    .bind(event.external_id())
    .bind(event.stream_url())
    .bind(event.source_url())
    .bind(event.thumbnail_url())
    .bind(event.scheduled_at())
    .bind(event.started_at())
    .bind(event.ended_at())
    .bind(event.status().as_str())
    .bind(event.viewer_count())
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrites every mutable column of an existing row and bumps `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn update_streaming_event(pool: &PgPool, event: &StreamingEvent) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE streaming_events SET \
             title = $2, \
             description = $3, \
             platform = $4, \
             external_id = $5, \
             stream_url = $6, \
             source_url = $7, \
             thumbnail_url = $8, \
             scheduled_at = $9, \
             started_at = $10, \
             ended_at = $11, \
             status = $12, \
             viewer_count = $13, \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(event.id())
    .bind(event.title())
    .bind(event.description())
    .bind(event.platform().map(StreamingPlatform::as_str))
    .bind(event.external_id())
    .bind(event.stream_url())
    .bind(event.source_url())
    .bind(event.thumbnail_url())
    .bind(event.scheduled_at())
    .bind(event.started_at())
    .bind(event.ended_at())
    .bind(event.status().as_str())
    .bind(event.viewer_count())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(event_id = %event.id(), "update matched no streaming event");
        return Err(DbError::NotFound);
    }
    Ok(())
}
