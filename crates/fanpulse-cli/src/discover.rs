//! `fanpulse discover` and `fanpulse streams` handlers.

use std::sync::Arc;
use std::time::Duration;

use fanpulse_core::{AppConfig, StreamLister};
use fanpulse_db::PgStore;
use fanpulse_sync::DiscoverySweep;
use fanpulse_youtube::{YtDlpConfig, YtDlpLister};

/// Runs one discovery sweep over every active channel.
///
/// Per-channel and per-stream failures are reported in the printed result;
/// only failing to load the channel list is an error.
pub(crate) async fn run_discover(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    json: bool,
) -> anyhow::Result<()> {
    let store = Arc::new(PgStore::new(pool.clone()));
    let lister = Arc::new(YtDlpLister::new(YtDlpConfig::from_app_config(config)));

    let sweep = DiscoverySweep::new(store.clone(), store, lister)
        .with_channel_delay(Duration::from_millis(config.discovery_channel_delay_ms));
    let result = sweep.run().await?;

    crate::print_sweep_result("discover", &result, json)
}

/// Lists one channel and prints what discovery would upsert.
pub(crate) async fn run_streams(
    config: &AppConfig,
    handle: &str,
    json: bool,
) -> anyhow::Result<()> {
    let lister = YtDlpLister::new(YtDlpConfig::from_app_config(config));
    let streams = lister.list(handle).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&streams)?);
        return Ok(());
    }

    if streams.is_empty() {
        println!("no streams found for {handle}");
        return Ok(());
    }
    for stream in &streams {
        let scheduled = stream
            .scheduled_at
            .map_or_else(|| "-".to_string(), |at| at.to_rfc3339());
        println!(
            "{:<9} {}  {}  {}",
            stream.status, stream.external_id, scheduled, stream.title
        );
    }
    println!("{} stream(s)", streams.len());
    Ok(())
}
