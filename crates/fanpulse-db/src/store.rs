//! [`EventStore`] and [`ChannelStore`] backed by Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fanpulse_core::{
    ArtistChannel, ChannelStore, EventStore, StoreError, StreamingEvent, StreamingPlatform,
    StreamingStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{artist_channels, streaming_events, DbError};

/// Postgres-backed store. Each call runs on its own pooled connection, so
/// every write commits independently.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_unique_violation() {
            return StoreError::Conflict(err.to_string());
        }
        match err {
            DbError::NotFound => StoreError::NotFound("no row with that id".to_owned()),
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StreamingEvent>, StoreError> {
        Ok(streaming_events::get_streaming_event(&self.pool, id).await?)
    }

    async fn find_by_external_id(
        &self,
        platform: StreamingPlatform,
        external_id: &str,
    ) -> Result<Option<StreamingEvent>, StoreError> {
        Ok(streaming_events::find_by_platform_external_id(&self.pool, platform, external_id).await?)
    }

    async fn find_by_stream_url(
        &self,
        stream_url: &str,
    ) -> Result<Option<StreamingEvent>, StoreError> {
        Ok(streaming_events::find_by_stream_url(&self.pool, stream_url).await?)
    }

    async fn list_by_status(
        &self,
        status: StreamingStatus,
    ) -> Result<Vec<StreamingEvent>, StoreError> {
        Ok(streaming_events::list_events_by_status(&self.pool, status).await?)
    }

    async fn list_by_status_not(
        &self,
        status: StreamingStatus,
    ) -> Result<Vec<StreamingEvent>, StoreError> {
        Ok(streaming_events::list_events_by_status_not(&self.pool, status).await?)
    }

    async fn insert(&self, event: &StreamingEvent) -> Result<(), StoreError> {
        Ok(streaming_events::insert_streaming_event(&self.pool, event).await?)
    }

    async fn save(&self, event: &StreamingEvent) -> Result<(), StoreError> {
        Ok(streaming_events::update_streaming_event(&self.pool, event).await?)
    }
}

#[async_trait]
impl ChannelStore for PgStore {
    async fn list_active_channels(
        &self,
        platform: StreamingPlatform,
    ) -> Result<Vec<ArtistChannel>, StoreError> {
        Ok(artist_channels::list_active_channels(&self.pool, platform).await?)
    }

    async fn mark_crawled(&self, channel_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(artist_channels::mark_channel_crawled(&self.pool, channel_id, at).await?)
    }
}
