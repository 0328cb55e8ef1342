//! In-memory port fakes shared by the sweep tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use fanpulse_core::{
    ArtistChannel, ChannelStore, DiscoveredStream, EventStore, ListingError, MetadataSource,
    StoreError, StreamLister, StreamingEvent, StreamingPlatform, StreamingStatus, VideoMetadata,
};
use fanpulse_youtube::{build_embed_url, build_watch_url};
use uuid::Uuid;

pub(crate) fn discovered(video_id: &str, status: StreamingStatus) -> DiscoveredStream {
    DiscoveredStream {
        platform: StreamingPlatform::YouTube,
        external_id: video_id.to_owned(),
        title: format!("Stream {video_id}"),
        description: None,
        stream_url: build_embed_url(video_id),
        source_url: Some(build_watch_url(video_id)),
        thumbnail_url: None,
        scheduled_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()),
        started_at: None,
        ended_at: None,
        status,
        viewer_count: None,
    }
}

pub(crate) fn channel(handle: &str) -> ArtistChannel {
    ArtistChannel {
        id: Uuid::new_v4(),
        artist_id: Uuid::new_v4(),
        platform: StreamingPlatform::YouTube,
        channel_handle: handle.to_owned(),
        channel_id: None,
        channel_url: None,
        is_official: true,
        is_active: true,
        last_crawled_at: None,
    }
}

#[derive(Default)]
pub(crate) struct InMemoryEventStore {
    events: Mutex<Vec<StreamingEvent>>,
    conflict_on_insert: Mutex<bool>,
    failing_saves: Mutex<HashSet<Uuid>>,
    pub(crate) saves: AtomicUsize,
}

impl InMemoryEventStore {
    pub(crate) fn seed(&self, event: StreamingEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub(crate) fn all(&self) -> Vec<StreamingEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn get(&self, id: Uuid) -> Option<StreamingEvent> {
        self.all().into_iter().find(|e| e.id() == id)
    }

    pub(crate) fn fail_inserts_with_conflict(&self) {
        *self.conflict_on_insert.lock().unwrap() = true;
    }

    pub(crate) fn fail_saves_for(&self, id: Uuid) {
        self.failing_saves.lock().unwrap().insert(id);
    }

    fn sorted(mut events: Vec<StreamingEvent>) -> Vec<StreamingEvent> {
        events.sort_by_key(StreamingEvent::scheduled_at);
        events
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StreamingEvent>, StoreError> {
        Ok(self.get(id))
    }

    async fn find_by_external_id(
        &self,
        platform: StreamingPlatform,
        external_id: &str,
    ) -> Result<Option<StreamingEvent>, StoreError> {
        Ok(self
            .all()
            .into_iter()
            .find(|e| e.platform() == Some(platform) && e.external_id() == Some(external_id)))
    }

    async fn find_by_stream_url(
        &self,
        stream_url: &str,
    ) -> Result<Option<StreamingEvent>, StoreError> {
        Ok(self.all().into_iter().find(|e| e.stream_url() == stream_url))
    }

    async fn list_by_status(
        &self,
        status: StreamingStatus,
    ) -> Result<Vec<StreamingEvent>, StoreError> {
        Ok(Self::sorted(
            self.all().into_iter().filter(|e| e.status() == status).collect(),
        ))
    }

    async fn list_by_status_not(
        &self,
        status: StreamingStatus,
    ) -> Result<Vec<StreamingEvent>, StoreError> {
        Ok(Self::sorted(
            self.all().into_iter().filter(|e| e.status() != status).collect(),
        ))
    }

    async fn insert(&self, event: &StreamingEvent) -> Result<(), StoreError> {
        if *self.conflict_on_insert.lock().unwrap() {
            return Err(StoreError::Conflict("ux_streaming_events_platform_external_id".into()));
        }
        let mut events = self.events.lock().unwrap();
        let duplicate = event.external_id().is_some()
            && events.iter().any(|e| {
                e.platform() == event.platform() && e.external_id() == event.external_id()
            });
        if duplicate {
            return Err(StoreError::Conflict("ux_streaming_events_platform_external_id".into()));
        }
        events.push(event.clone());
        Ok(())
    }

    async fn save(&self, event: &StreamingEvent) -> Result<(), StoreError> {
        if self.failing_saves.lock().unwrap().contains(&event.id()) {
            return Err(StoreError::Backend("connection reset".into()));
        }
        let mut events = self.events.lock().unwrap();
        let slot = events
            .iter_mut()
            .find(|e| e.id() == event.id())
            .ok_or_else(|| StoreError::NotFound(event.id().to_string()))?;
        *slot = event.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryChannelStore {
    channels: Mutex<Vec<ArtistChannel>>,
    fail_listing: Mutex<bool>,
    fail_mark: Mutex<bool>,
}

impl InMemoryChannelStore {
    pub(crate) fn with_channels(channels: Vec<ArtistChannel>) -> Self {
        Self {
            channels: Mutex::new(channels),
            ..Self::default()
        }
    }

    pub(crate) fn crawled_at(&self, handle: &str) -> Option<DateTime<Utc>> {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.channel_handle == handle)
            .and_then(|c| c.last_crawled_at)
    }

    pub(crate) fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    pub(crate) fn fail_mark_crawled(&self) {
        *self.fail_mark.lock().unwrap() = true;
    }
}

#[async_trait]
impl ChannelStore for InMemoryChannelStore {
    async fn list_active_channels(
        &self,
        platform: StreamingPlatform,
    ) -> Result<Vec<ArtistChannel>, StoreError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(StoreError::Backend("database unavailable".into()));
        }
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active && c.platform == platform)
            .cloned()
            .collect())
    }

    async fn mark_crawled(&self, channel_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if *self.fail_mark.lock().unwrap() {
            return Err(StoreError::Backend("connection reset".into()));
        }
        let mut channels = self.channels.lock().unwrap();
        let channel = channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| StoreError::NotFound(channel_id.to_string()))?;
        channel.last_crawled_at = Some(at);
        Ok(())
    }
}

enum Scripted {
    Streams(Vec<DiscoveredStream>),
    Failed(String),
    TimedOut,
}

/// Returns canned listings per handle; unknown handles list nothing.
#[derive(Default)]
pub(crate) struct ScriptedLister {
    listings: HashMap<String, Scripted>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl ScriptedLister {
    pub(crate) fn with(mut self, handle: &str, streams: Vec<DiscoveredStream>) -> Self {
        self.listings.insert(handle.to_owned(), Scripted::Streams(streams));
        self
    }

    pub(crate) fn failing(mut self, handle: &str, output: &str) -> Self {
        self.listings.insert(handle.to_owned(), Scripted::Failed(output.to_owned()));
        self
    }

    pub(crate) fn timing_out(mut self, handle: &str) -> Self {
        self.listings.insert(handle.to_owned(), Scripted::TimedOut);
        self
    }
}

#[async_trait]
impl StreamLister for ScriptedLister {
    async fn list(&self, channel_handle: &str) -> Result<Vec<DiscoveredStream>, ListingError> {
        self.calls.lock().unwrap().push(channel_handle.to_owned());
        match self.listings.get(channel_handle) {
            Some(Scripted::Streams(streams)) => Ok(streams.clone()),
            Some(Scripted::Failed(output)) => Err(ListingError::Failed {
                command: "yt-dlp".to_owned(),
                code: Some(1),
                output: output.clone(),
            }),
            Some(Scripted::TimedOut) => Err(ListingError::Timeout {
                command: "yt-dlp".to_owned(),
                timeout_ms: 20_000,
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Serves metadata for known video ids and counts lookups.
#[derive(Default)]
pub(crate) struct StaticMetadataSource {
    metadata: HashMap<String, VideoMetadata>,
    pub(crate) fetches: AtomicUsize,
}

impl StaticMetadataSource {
    pub(crate) fn with(mut self, video_id: &str, title: &str, thumbnail: Option<&str>) -> Self {
        self.metadata.insert(
            video_id.to_owned(),
            VideoMetadata {
                title: title.to_owned(),
                author_name: "The Band".to_owned(),
                thumbnail_url: thumbnail.map(str::to_owned),
                provider_name: "YouTube".to_owned(),
            },
        );
        self
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn fetch(&self, video_id: &str) -> Option<VideoMetadata> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.metadata.get(video_id).cloned()
    }
}
