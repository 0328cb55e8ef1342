use fanpulse_core::channels::normalize_handle;
use fanpulse_core::ChannelConfig;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Upsert artist channels from config into the database.
///
/// Handles are stored in their normalized `@handle` form. Returns the number
/// of channels processed (inserted or updated). All upserts run inside a
/// single transaction; if any operation fails the entire batch is rolled
/// back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_channels(pool: &PgPool, channels: &[ChannelConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for channel in channels {
        let handle = normalize_handle(&channel.handle);

        sqlx::query(
            "INSERT INTO artist_channels \
                 (id, artist_id, platform, channel_handle, channel_id, channel_url, is_official, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (platform, channel_handle) DO UPDATE SET \
                 artist_id = EXCLUDED.artist_id, \
                 channel_id = EXCLUDED.channel_id, \
                 channel_url = EXCLUDED.channel_url, \
                 is_official = EXCLUDED.is_official, \
                 is_active = EXCLUDED.is_active, \
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(channel.artist_id)
        .bind(channel.platform.as_str())
        .bind(&handle)
        .bind(&channel.channel_id)
        .bind(&channel.channel_url)
        .bind(channel.official)
        .bind(channel.active)
        .execute(&mut *tx)
        .await?;

        tracing::debug!(
            handle = %handle,
            artist_id = %channel.artist_id,
            active = channel.active,
            "seed: upserted artist channel"
        );
        count += 1;
    }

    tx.commit().await?;
    tracing::info!(count, "seed: artist channels committed");
    Ok(count)
}
