//! The `StreamingEvent` aggregate and its status/platform enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::discovery::DiscoveredStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamingPlatform {
    #[serde(rename = "YOUTUBE")]
    YouTube,
}

impl StreamingPlatform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StreamingPlatform::YouTube => "YOUTUBE",
        }
    }
}

impl std::fmt::Display for StreamingPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StreamingPlatform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "YOUTUBE" => Ok(StreamingPlatform::YouTube),
            _ => Err(DomainError::UnknownPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamingStatus {
    Scheduled,
    Live,
    Ended,
}

impl StreamingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StreamingStatus::Scheduled => "SCHEDULED",
            StreamingStatus::Live => "LIVE",
            StreamingStatus::Ended => "ENDED",
        }
    }
}

impl std::fmt::Display for StreamingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StreamingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(StreamingStatus::Scheduled),
            "LIVE" => Ok(StreamingStatus::Live),
            "ENDED" => Ok(StreamingStatus::Ended),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown streaming platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown streaming status: {0}")]
    UnknownStatus(String),

    #[error("cannot {action} from status {from}")]
    InvalidTransition {
        action: &'static str,
        from: StreamingStatus,
    },

    #[error("viewer count cannot be negative: {0}")]
    NegativeViewerCount(i64),
}

/// A live stream, premiere or past broadcast tracked by the catalog.
///
/// Fields are read-only from outside; every mutation goes through a method so
/// the discovery and refresh paths apply the same rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingEvent {
    id: Uuid,
    artist_id: Uuid,
    title: String,
    description: Option<String>,
    platform: Option<StreamingPlatform>,
    external_id: Option<String>,
    stream_url: String,
    source_url: Option<String>,
    thumbnail_url: Option<String>,
    scheduled_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    status: StreamingStatus,
    viewer_count: i64,
}

/// Every persisted column of a [`StreamingEvent`], used to rebuild the
/// aggregate from storage.
#[derive(Debug, Clone)]
pub struct StreamingEventParts {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub platform: Option<StreamingPlatform>,
    pub external_id: Option<String>,
    pub stream_url: String,
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: StreamingStatus,
    pub viewer_count: i64,
}

impl StreamingEvent {
    /// Builds a brand-new event from a discovery result.
    ///
    /// `scheduled_at` falls back to the start time, then the end time, then
    /// `now`. A missing viewer count becomes `0`.
    #[must_use]
    pub fn from_discovered(artist_id: Uuid, stream: &DiscoveredStream, now: DateTime<Utc>) -> Self {
        let scheduled_at = stream
            .scheduled_at
            .or(stream.started_at)
            .or(stream.ended_at)
            .unwrap_or(now);

        Self {
            id: Uuid::new_v4(),
            artist_id,
            title: stream.title.clone(),
            description: stream.description.clone(),
            platform: Some(stream.platform),
            external_id: Some(stream.external_id.clone()),
            stream_url: stream.stream_url.clone(),
            source_url: stream.source_url.clone(),
            thumbnail_url: stream.thumbnail_url.clone(),
            scheduled_at,
            started_at: stream.started_at,
            ended_at: stream.ended_at,
            status: stream.status,
            viewer_count: stream.viewer_count.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn from_parts(parts: StreamingEventParts) -> Self {
        Self {
            id: parts.id,
            artist_id: parts.artist_id,
            title: parts.title,
            description: parts.description,
            platform: parts.platform,
            external_id: parts.external_id,
            stream_url: parts.stream_url,
            source_url: parts.source_url,
            thumbnail_url: parts.thumbnail_url,
            scheduled_at: parts.scheduled_at,
            started_at: parts.started_at,
            ended_at: parts.ended_at,
            status: parts.status,
            viewer_count: parts.viewer_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn artist_id(&self) -> Uuid {
        self.artist_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn platform(&self) -> Option<StreamingPlatform> {
        self.platform
    }

    #[must_use]
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    #[must_use]
    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    #[must_use]
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    #[must_use]
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn status(&self) -> StreamingStatus {
        self.status
    }

    #[must_use]
    pub fn viewer_count(&self) -> i64 {
        self.viewer_count
    }

    /// Replaces the title, and the thumbnail when a new one is supplied.
    pub fn update_metadata(&mut self, title: &str, thumbnail_url: Option<&str>) {
        self.title = title.to_string();
        if let Some(thumb) = thumbnail_url {
            self.thumbnail_url = Some(thumb.to_string());
        }
    }

    pub fn update_description(&mut self, description: Option<&str>) {
        self.description = description.map(str::to_string);
    }

    pub fn update_source_identity(
        &mut self,
        platform: StreamingPlatform,
        external_id: Option<&str>,
    ) {
        self.platform = Some(platform);
        self.external_id = external_id.map(str::to_string);
    }

    pub fn update_source_url(&mut self, source_url: Option<&str>) {
        self.source_url = source_url.map(str::to_string);
    }

    /// Re-applies the status reported by a discovery pass.
    ///
    /// The status is always overwritten. Timestamps are only replaced when the
    /// discovery pass reported one; a missing value keeps what is stored.
    /// There is no monotonic guard: a stale listing can move an `ENDED` event
    /// back to `LIVE`.
    pub fn apply_discovery_status(
        &mut self,
        status: StreamingStatus,
        scheduled_at: Option<DateTime<Utc>>,
        started_at: Option<DateTime<Utc>>,
        ended_at: Option<DateTime<Utc>>,
    ) {
        self.status = status;
        if let Some(at) = scheduled_at {
            self.scheduled_at = at;
        }
        if started_at.is_some() {
            self.started_at = started_at;
        }
        if ended_at.is_some() {
            self.ended_at = ended_at;
        }
    }

    /// # Errors
    ///
    /// Returns [`DomainError::NegativeViewerCount`] for counts below zero.
    pub fn update_viewer_count(&mut self, count: i64) -> Result<(), DomainError> {
        if count < 0 {
            return Err(DomainError::NegativeViewerCount(count));
        }
        self.viewer_count = count;
        Ok(())
    }

    /// Moves a scheduled event to `LIVE`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] unless the event is `SCHEDULED`.
    pub fn go_live(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != StreamingStatus::Scheduled {
            return Err(DomainError::InvalidTransition {
                action: "go live",
                from: self.status,
            });
        }
        self.status = StreamingStatus::Live;
        self.started_at = Some(now);
        Ok(())
    }

    /// Ends a live event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] unless the event is `LIVE`.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != StreamingStatus::Live {
            return Err(DomainError::InvalidTransition {
                action: "end",
                from: self.status,
            });
        }
        self.status = StreamingStatus::Ended;
        self.ended_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "streaming_test.rs"]
mod tests;
