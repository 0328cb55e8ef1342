//! Database operations for `artist_channels`.

use chrono::{DateTime, Utc};
use fanpulse_core::{ArtistChannel, StreamingPlatform};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `artist_channels` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArtistChannelRow {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub platform: String,
    pub channel_handle: String,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    pub is_official: bool,
    pub is_active: bool,
    pub last_crawled_at: Option<DateTime<Utc>>,
}

impl TryFrom<ArtistChannelRow> for ArtistChannel {
    type Error = DbError;

    fn try_from(row: ArtistChannelRow) -> Result<Self, Self::Error> {
        Ok(ArtistChannel {
            id: row.id,
            artist_id: row.artist_id,
            platform: row.platform.parse()?,
            channel_handle: row.channel_handle,
            channel_id: row.channel_id,
            channel_url: row.channel_url,
            is_official: row.is_official,
            is_active: row.is_active,
            last_crawled_at: row.last_crawled_at,
        })
    }
}

/// Lists active channels on `platform`, least recently crawled first.
///
/// Never-crawled channels sort ahead of everything else.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure or [`DbError::InvalidRow`] if
/// a stored platform is not recognised.
pub async fn list_active_channels(
    pool: &PgPool,
    platform: StreamingPlatform,
) -> Result<Vec<ArtistChannel>, DbError> {
    let rows = sqlx::query_as::<_, ArtistChannelRow>(
        "SELECT id, artist_id, platform, channel_handle, channel_id, channel_url, \
                is_official, is_active, last_crawled_at \
         FROM artist_channels \
         WHERE is_active = true AND platform = $1 \
         ORDER BY last_crawled_at ASC NULLS FIRST, channel_handle ASC",
    )
    .bind(platform.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ArtistChannel::try_from).collect()
}

/// Stamps `last_crawled_at` on one channel.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the channel does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_channel_crawled(
    pool: &PgPool,
    channel_id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE artist_channels SET last_crawled_at = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(channel_id)
    .bind(at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
