//! Domain types, ports and configuration shared by the stream sync pipeline.

pub mod app_config;
pub mod channels;
pub mod config;
pub mod discovery;
pub mod metadata;
pub mod ports;
pub mod streaming;
pub mod sweep;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use channels::{load_channels, ChannelConfig, ChannelsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use discovery::{ArtistChannel, DiscoveredStream};
pub use metadata::{MetadataChanged, VideoMetadata};
pub use ports::{
    ChangeNotifier, ChannelStore, EventStore, ListingError, MetadataSource, NotifyError,
    StoreError, StreamLister,
};
pub use streaming::{DomainError, StreamingEvent, StreamingPlatform, StreamingStatus};
pub use sweep::{SweepResult, UpsertOutcome};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read channels file {path}: {source}")]
    ChannelsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse channels file: {0}")]
    ChannelsFileParse(#[from] serde_yaml::Error),

    #[error("channels config validation failed: {0}")]
    Validation(String),
}
