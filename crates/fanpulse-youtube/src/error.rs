use thiserror::Error;

#[derive(Debug, Error)]
pub enum OEmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oEmbed returned HTTP {status} for video {video_id}")]
    Status { status: u16, video_id: String },

    #[error("JSON deserialization error for video {video_id}: {source}")]
    Deserialize {
        video_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid oEmbed base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
