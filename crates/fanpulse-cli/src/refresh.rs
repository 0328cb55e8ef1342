//! `fanpulse refresh` handlers.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use fanpulse_core::AppConfig;
use fanpulse_db::PgStore;
use fanpulse_sync::{MetadataRefreshSweep, MetadataUpdateUnit, TracingNotifier};
use fanpulse_youtube::{OEmbedClient, OEmbedConfig};
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum RefreshCommands {
    /// Refresh every live event
    Live {
        /// Print the sweep result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh every event that has not ended
    Active {
        /// Print the sweep result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh a single event by id
    Event {
        /// Streaming event id
        id: Uuid,
    },
}

pub(crate) async fn run_refresh(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: RefreshCommands,
) -> anyhow::Result<()> {
    let store = Arc::new(PgStore::new(pool.clone()));
    let oembed = Arc::new(OEmbedClient::new(&OEmbedConfig::from_app_config(config))?);
    let updater = MetadataUpdateUnit::new(store.clone(), oembed, Arc::new(TracingNotifier));
    let sweep = MetadataRefreshSweep::new(store, updater).with_batching(
        config.refresh_batch_size,
        Duration::from_millis(config.refresh_batch_delay_ms),
    );

    match command {
        RefreshCommands::Live { json } => {
            let result = sweep.refresh_live().await?;
            crate::print_sweep_result("refresh live", &result, json)
        }
        RefreshCommands::Active { json } => {
            let result = sweep.refresh_active().await?;
            crate::print_sweep_result("refresh active", &result, json)
        }
        RefreshCommands::Event { id } => {
            if sweep.refresh_event(id).await? {
                println!("refreshed event {id}");
            } else {
                println!("event {id} was not refreshed (unknown id or no metadata)");
            }
            Ok(())
        }
    }
}
