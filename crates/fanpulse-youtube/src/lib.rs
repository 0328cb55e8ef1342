//! YouTube adapters: channel listing through `yt-dlp` and metadata lookups
//! through the public oEmbed endpoint.

pub mod error;
pub mod oembed;
pub(crate) mod retry;
pub mod video_id;
pub mod ytdlp;

pub use error::OEmbedError;
pub use oembed::{OEmbedClient, OEmbedConfig};
pub use retry::{classify, FailureClass};
pub use video_id::{build_embed_url, build_watch_url, extract_video_id};
pub use ytdlp::{ProcessOutput, ProcessRunner, TokioProcessRunner, YtDlpConfig, YtDlpLister};
