//! Lightweight video metadata and the change notification raised when it
//! alters a stored event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public metadata for one video, as returned by the oEmbed provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author_name: String,
    pub thumbnail_url: Option<String>,
    pub provider_name: String,
}

/// Raised when a metadata refresh changed an event's title or thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataChanged {
    pub event_id: Uuid,
    pub previous_title: String,
    pub new_title: String,
    pub previous_thumbnail_url: Option<String>,
    pub new_thumbnail_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl MetadataChanged {
    #[must_use]
    pub fn title_changed(&self) -> bool {
        self.previous_title != self.new_title
    }

    #[must_use]
    pub fn thumbnail_changed(&self) -> bool {
        self.previous_thumbnail_url != self.new_thumbnail_url
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.title_changed() || self.thumbnail_changed()
    }
}
