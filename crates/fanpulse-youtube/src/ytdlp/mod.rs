//! Channel listing through the `yt-dlp` command-line tool.

mod mapping;
mod parse;
mod runner;

use std::time::Duration;

use async_trait::async_trait;
use fanpulse_core::channels::{is_valid_handle, normalize_handle};
use fanpulse_core::{AppConfig, DiscoveredStream, ListingError, StreamLister};

pub use mapping::to_discovered_stream;
pub use parse::{parse, RawEntry};
pub use runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};

#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    pub command: String,
    pub timeout_ms: u64,
    /// Upper bound passed as `--playlist-items 1:<limit>`.
    pub playlist_limit: u32,
    pub extract_flat: bool,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            command: "yt-dlp".to_owned(),
            timeout_ms: 20_000,
            playlist_limit: 30,
            extract_flat: false,
        }
    }
}

impl YtDlpConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            command: config.ytdlp_command.clone(),
            timeout_ms: config.ytdlp_timeout_ms,
            playlist_limit: config.ytdlp_playlist_limit,
            extract_flat: config.ytdlp_extract_flat,
        }
    }
}

/// Lists a channel's streams tab with `yt-dlp`.
pub struct YtDlpLister<R = TokioProcessRunner> {
    config: YtDlpConfig,
    runner: R,
}

impl YtDlpLister<TokioProcessRunner> {
    #[must_use]
    pub fn new(config: YtDlpConfig) -> Self {
        Self::with_runner(config, TokioProcessRunner)
    }
}

impl<R: ProcessRunner> YtDlpLister<R> {
    pub fn with_runner(config: YtDlpConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Arguments for one listing, URL last.
    #[must_use]
    pub fn build_args(&self, channel_url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_owned(),
            "--skip-download".to_owned(),
            "--no-warnings".to_owned(),
            "--quiet".to_owned(),
            "--playlist-items".to_owned(),
            format!("1:{}", self.config.playlist_limit),
        ];
        if self.config.extract_flat {
            args.push("--extract-flat".to_owned());
        }
        args.push(channel_url.to_owned());
        args
    }
}

/// `https://www.youtube.com/@handle/streams` for a validated handle.
///
/// # Errors
///
/// Returns [`ListingError::InvalidHandle`] if `handle` contains anything
/// besides letters, digits, `_`, `.` and `-` after an optional leading `@`.
pub fn channel_streams_url(handle: &str) -> Result<String, ListingError> {
    if !is_valid_handle(handle) {
        return Err(ListingError::InvalidHandle(handle.to_owned()));
    }
    Ok(format!(
        "https://www.youtube.com/{}/streams",
        normalize_handle(handle)
    ))
}

#[async_trait]
impl<R: ProcessRunner> StreamLister for YtDlpLister<R> {
    async fn list(&self, channel_handle: &str) -> Result<Vec<DiscoveredStream>, ListingError> {
        let channel_url = channel_streams_url(channel_handle)?;
        let args = self.build_args(&channel_url);

        tracing::debug!(channel = channel_handle, url = %channel_url, "running yt-dlp");
        let output = self
            .runner
            .run(
                &self.config.command,
                &args,
                Duration::from_millis(self.config.timeout_ms),
            )
            .await?;

        if !output.success() {
            return Err(ListingError::Failed {
                command: self.config.command.clone(),
                code: output.code,
                output: output.combined(),
            });
        }

        let entries = parse(&output.stdout);
        let entry_count = entries.len();
        let streams: Vec<DiscoveredStream> =
            entries.iter().filter_map(to_discovered_stream).collect();

        tracing::debug!(
            channel = channel_handle,
            entries = entry_count,
            streams = streams.len(),
            "yt-dlp listing decoded"
        );
        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanpulse_core::StreamingStatus;
    use std::sync::Mutex;

    /// Replays a canned result and records every invocation.
    struct FakeRunner {
        result: Mutex<Option<Result<ProcessOutput, ListingError>>>,
        calls: Mutex<Vec<(String, Vec<String>, Duration)>>,
    }

    impl FakeRunner {
        fn returning(result: Result<ProcessOutput, ListingError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok(code: i32, stdout: &str, stderr: &str) -> Self {
            Self::returning(Ok(ProcessOutput {
                code: Some(code),
                stdout: stdout.to_owned(),
                stderr: stderr.to_owned(),
            }))
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(
            &self,
            command: &str,
            args: &[String],
            timeout: Duration,
        ) -> Result<ProcessOutput, ListingError> {
            self.calls
                .lock()
                .unwrap()
                .push((command.to_owned(), args.to_vec(), timeout));
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("runner called more than once")
        }
    }

    fn lister(runner: FakeRunner) -> YtDlpLister<FakeRunner> {
        YtDlpLister::with_runner(YtDlpConfig::default(), runner)
    }

    #[test]
    fn streams_url_normalizes_handle() {
        assert_eq!(
            channel_streams_url("lofigirl").unwrap(),
            "https://www.youtube.com/@lofigirl/streams"
        );
        assert_eq!(
            channel_streams_url("@lofi.girl-2").unwrap(),
            "https://www.youtube.com/@lofi.girl-2/streams"
        );
    }

    #[test]
    fn args_follow_config() {
        let flat = YtDlpLister::with_runner(
            YtDlpConfig {
                playlist_limit: 5,
                extract_flat: true,
                ..YtDlpConfig::default()
            },
            FakeRunner::ok(0, "", ""),
        );

        assert_eq!(
            flat.build_args("https://www.youtube.com/@x/streams"),
            vec![
                "--dump-single-json",
                "--skip-download",
                "--no-warnings",
                "--quiet",
                "--playlist-items",
                "1:5",
                "--extract-flat",
                "https://www.youtube.com/@x/streams",
            ]
        );
    }

    #[tokio::test]
    async fn invalid_handle_never_spawns() {
        let lister = lister(FakeRunner::ok(0, "", ""));

        let err = lister.list("bad handle; rm -rf").await.unwrap_err();

        assert!(matches!(err, ListingError::InvalidHandle(_)));
        assert!(lister.runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_listing_maps_entries() {
        let stdout = r#"{"entries": [
            {"id": "aaaaaaaaaaa", "title": "Live now", "live_status": "is_live", "timestamp": 1700000000},
            {"title": "no id here"},
            {"id": "bbbbbbbbbbb", "title": "Next week", "live_status": "is_upcoming", "release_timestamp": 1800000000}
        ]}"#;
        let lister = lister(FakeRunner::ok(0, stdout, ""));

        let streams = lister.list("lofigirl").await.unwrap();

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].status, StreamingStatus::Live);
        assert_eq!(streams[1].status, StreamingStatus::Scheduled);

        let calls = lister.runner.calls.lock().unwrap();
        let (command, args, timeout) = &calls[0];
        assert_eq!(command, "yt-dlp");
        assert_eq!(
            args.last().map(String::as_str),
            Some("https://www.youtube.com/@lofigirl/streams")
        );
        assert_eq!(*timeout, Duration::from_millis(20_000));
    }

    #[tokio::test]
    async fn non_zero_exit_reports_combined_output() {
        let lister = lister(FakeRunner::ok(1, "", "ERROR: This channel does not exist"));

        let err = lister.list("@ghost").await.unwrap_err();

        match err {
            ListingError::Failed { code, output, .. } => {
                assert_eq!(code, Some(1));
                assert!(output.contains("does not exist"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn runner_timeout_propagates() {
        let lister = lister(FakeRunner::returning(Err(ListingError::Timeout {
            command: "yt-dlp".to_owned(),
            timeout_ms: 20_000,
        })));

        let err = lister.list("@slow").await.unwrap_err();

        assert!(matches!(err, ListingError::Timeout { .. }));
    }
}
