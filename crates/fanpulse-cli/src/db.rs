//! `fanpulse db` handlers.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert artist channels from the channels file
    Seed,
}

pub(crate) async fn run_db_command(
    pool: &sqlx::PgPool,
    config: &fanpulse_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            fanpulse_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = fanpulse_db::run_migrations(pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => {
            let file = fanpulse_core::load_channels(&config.channels_path)?;
            let seeded = fanpulse_db::seed_channels(pool, &file.channels).await?;
            tracing::info!(
                seeded,
                path = %config.channels_path.display(),
                "channels seeded"
            );
            println!("seeded {seeded} channel(s)");
        }
    }
    Ok(())
}
