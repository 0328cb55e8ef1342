use super::*;
use crate::testing::{
    channel, discovered, InMemoryChannelStore, InMemoryEventStore, ScriptedLister,
};
use async_trait::async_trait;
use chrono::TimeZone;
use fanpulse_core::{ListingError, StreamingStatus};
use fanpulse_youtube::{ProcessOutput, ProcessRunner, YtDlpConfig, YtDlpLister};

fn sweep(
    channels: &Arc<InMemoryChannelStore>,
    events: &Arc<InMemoryEventStore>,
    lister: ScriptedLister,
) -> DiscoverySweep {
    DiscoverySweep::new(channels.clone(), events.clone(), Arc::new(lister))
}

#[tokio::test]
async fn failing_channel_does_not_stop_the_others() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![
        channel("@alpha"),
        channel("@bravo"),
        channel("@charlie"),
    ]));
    let events = Arc::new(InMemoryEventStore::default());
    let lister = ScriptedLister::default()
        .with(
            "@alpha",
            vec![
                discovered("aaaaaaaaaa1", StreamingStatus::Live),
                discovered("aaaaaaaaaa2", StreamingStatus::Ended),
            ],
        )
        .failing("@bravo", "ERROR: HTTP Error 403")
        .with("@charlie", vec![discovered("ccccccccccc", StreamingStatus::Scheduled)]);

    let result = sweep(&channels, &events, lister).run().await.unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.inserted, 3);
    assert_eq!(result.failed, 1);
    assert_eq!(result.channels_failed, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("channel=@bravo, error="));
    assert!(result.errors[0].contains("HTTP Error 403"));
    assert_eq!(events.all().len(), 3);

    assert!(channels.crawled_at("@alpha").is_some());
    assert!(channels.crawled_at("@bravo").is_none());
    assert!(channels.crawled_at("@charlie").is_some());
}

#[tokio::test]
async fn timed_out_listing_is_isolated_to_its_channel() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![
        channel("@alpha"),
        channel("@bravo"),
        channel("@charlie"),
    ]));
    let events = Arc::new(InMemoryEventStore::default());
    let lister = ScriptedLister::default()
        .with("@alpha", vec![discovered("aaaaaaaaaa1", StreamingStatus::Live)])
        .timing_out("@bravo")
        .with("@charlie", vec![discovered("ccccccccccc", StreamingStatus::Ended)]);

    let result = sweep(&channels, &events, lister).run().await.unwrap();

    assert_eq!(result.inserted, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.channels_failed, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("channel=@bravo, error="));
    assert!(result.errors[0].contains("timed out after 20000ms"));
    assert_eq!(events.all().len(), 2);

    assert!(channels.crawled_at("@alpha").is_some());
    assert!(channels.crawled_at("@bravo").is_none());
    assert!(channels.crawled_at("@charlie").is_some());
}

#[tokio::test]
async fn second_run_updates_instead_of_inserting() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![channel("@alpha")]));
    let events = Arc::new(InMemoryEventStore::default());
    let listing = || {
        ScriptedLister::default().with(
            "@alpha",
            vec![
                discovered("aaaaaaaaaa1", StreamingStatus::Live),
                discovered("aaaaaaaaaa2", StreamingStatus::Live),
            ],
        )
    };

    let first = sweep(&channels, &events, listing()).run().await.unwrap();
    let second = sweep(&channels, &events, listing()).run().await.unwrap();

    assert_eq!((first.inserted, first.updated), (2, 0));
    assert_eq!((second.inserted, second.updated), (0, 2));
    assert_eq!(events.all().len(), 2);
}

#[tokio::test]
async fn upsert_failures_are_counted_per_stream() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![channel("@alpha")]));
    let events = Arc::new(InMemoryEventStore::default());
    events.fail_inserts_with_conflict();
    let lister = ScriptedLister::default().with(
        "@alpha",
        vec![discovered("aaaaaaaaaa1", StreamingStatus::Live)],
    );

    let result = sweep(&channels, &events, lister).run().await.unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.channels_failed, 0);
    assert!(result.errors[0].starts_with("channel=@alpha, external_id=aaaaaaaaaa1, error="));
    assert!(channels.crawled_at("@alpha").is_some(), "listing succeeded");
}

#[tokio::test]
async fn mark_crawled_failure_is_recorded_but_not_counted() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![channel("@alpha")]));
    channels.fail_mark_crawled();
    let events = Arc::new(InMemoryEventStore::default());
    let lister = ScriptedLister::default().with(
        "@alpha",
        vec![discovered("aaaaaaaaaa1", StreamingStatus::Live)],
    );

    let result = sweep(&channels, &events, lister).run().await.unwrap();

    assert_eq!(result.inserted, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("mark crawled failed"));
}

#[tokio::test]
async fn channel_list_failure_is_a_hard_error() {
    let channels = Arc::new(InMemoryChannelStore::default());
    channels.fail_listing();
    let events = Arc::new(InMemoryEventStore::default());

    let err = sweep(&channels, &events, ScriptedLister::default())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Store(_)));
}

#[tokio::test]
async fn inactive_channels_are_not_listed() {
    let mut dormant = channel("@dormant");
    dormant.is_active = false;
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![
        dormant,
        channel("@alpha"),
    ]));
    let events = Arc::new(InMemoryEventStore::default());
    let lister = Arc::new(ScriptedLister::default());

    DiscoverySweep::new(channels.clone(), events, lister.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(*lister.calls.lock().unwrap(), vec!["@alpha".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn channel_delay_applies_between_channels_only() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![
        channel("@alpha"),
        channel("@bravo"),
        channel("@charlie"),
    ]));
    let events = Arc::new(InMemoryEventStore::default());
    let sweep = sweep(&channels, &events, ScriptedLister::default())
        .with_channel_delay(Duration::from_secs(5));

    let started = tokio::time::Instant::now();
    sweep.run().await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(10), "elapsed = {elapsed:?}");
    assert!(elapsed < Duration::from_secs(15), "elapsed = {elapsed:?}");
}

/// Serves one canned `yt-dlp` payload for every invocation.
struct CannedRunner(&'static str);

#[async_trait]
impl ProcessRunner for CannedRunner {
    async fn run(
        &self,
        _command: &str,
        _args: &[String],
        _timeout: Duration,
    ) -> Result<ProcessOutput, ListingError> {
        Ok(ProcessOutput {
            code: Some(0),
            stdout: self.0.to_owned(),
            stderr: String::new(),
        })
    }
}

#[tokio::test]
async fn live_ytdlp_entry_is_stored_as_live_event() {
    let channels = Arc::new(InMemoryChannelStore::with_channels(vec![channel("@alpha")]));
    let events = Arc::new(InMemoryEventStore::default());
    let lister = YtDlpLister::with_runner(
        YtDlpConfig::default(),
        CannedRunner(
            r#"{"entries": [{"id": "dQw4w9WgXcQ", "title": "On air", "live_status": "is_live", "timestamp": 1700000000}]}"#,
        ),
    );

    let result = DiscoverySweep::new(channels, events.clone(), Arc::new(lister))
        .run()
        .await
        .unwrap();

    assert_eq!(result.inserted, 1);
    let stored = &events.all()[0];
    let expected = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    assert_eq!(stored.status(), StreamingStatus::Live);
    assert_eq!(stored.started_at(), Some(expected));
    assert_eq!(stored.scheduled_at(), expected);
    assert_eq!(stored.viewer_count(), 0);
    assert_eq!(stored.external_id(), Some("dQw4w9WgXcQ"));
}
