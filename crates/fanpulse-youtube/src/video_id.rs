//! YouTube video id extraction and canonical URL builders.

use std::sync::LazyLock;

use regex::Regex;

/// Embed, watch, short and live URL shapes, tried in that order.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"youtube\.com/embed/([a-zA-Z0-9_-]{11})").expect("valid regex"),
        Regex::new(r"youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})").expect("valid regex"),
        Regex::new(r"youtu\.be/([a-zA-Z0-9_-]{11})").expect("valid regex"),
        Regex::new(r"youtube\.com/live/([a-zA-Z0-9_-]{11})").expect("valid regex"),
    ]
});

/// Extracts the 11-character video id from a YouTube URL.
///
/// Returns `None` for blank input or a URL matching none of the known shapes.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    if url.trim().is_empty() {
        return None;
    }

    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

#[must_use]
pub fn build_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Player URL stored as an event's `stream_url`.
#[must_use]
pub fn build_embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}?rel=0&modestbranding=1&playsinline=1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_from_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_from_live_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/live/abc-DEF_123?feature=share").as_deref(),
            Some("abc-DEF_123")
        );
    }

    #[test]
    fn blank_and_unrecognised_urls_yield_none() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("   "), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn built_urls_round_trip_through_extraction() {
        let id = "dQw4w9WgXcQ";
        assert_eq!(extract_video_id(&build_watch_url(id)).as_deref(), Some(id));
        assert_eq!(extract_video_id(&build_embed_url(id)).as_deref(), Some(id));
    }

    #[test]
    fn embed_url_carries_player_flags() {
        assert_eq!(
            build_embed_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0&modestbranding=1&playsinline=1"
        );
    }
}
