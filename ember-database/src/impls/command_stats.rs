use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::{database::Database, model::command_stats::CommandStats};

#[derive(sqlx::FromRow)]
struct UsageRow {
    command_type: String,
    uses: i64,
}

/// Remember when a command was used for the first time. Later calls are no-ops.
pub async fn record_first_use(db: &Database, command_name: &str) -> anyhow::Result<()> {
    let created_at = i64::try_from(now_unix_secs()).context("created_at out of i64 range")?;

    sqlx::query(
        "INSERT INTO command_first_use (command_name, created_at) VALUES ($1, $2)
         ON CONFLICT (command_name) DO NOTHING",
    )
    .bind(command_name)
    .bind(created_at)
    .execute(db.pool())
    .await?;

    Ok(())
}

/// Bump the global, per-user and (when invoked in a guild) per-guild counters.
pub async fn increment_command_use(
    db: &Database,
    command_name: &str,
    command_type: &str,
    user_id: u64,
    guild_id: Option<u64>,
) -> anyhow::Result<()> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let guild_id_i64 = guild_id
        .map(i64::try_from)
        .transpose()
        .context("guild_id out of i64 range")?;

    let mut tx = db.pool().begin().await?;

    sqlx::query(
        "INSERT INTO command_stats (command_name, command_type, uses) VALUES ($1, $2, 1)
         ON CONFLICT (command_name, command_type) DO UPDATE SET uses = command_stats.uses + 1",
    )
    .bind(command_name)
    .bind(command_type)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO user_command_stats (user_id, command_name, command_type, uses) VALUES ($1, $2, $3, 1)
         ON CONFLICT (user_id, command_name, command_type)
         DO UPDATE SET uses = user_command_stats.uses + 1",
    )
    .bind(user_id_i64)
    .bind(command_name)
    .bind(command_type)
    .execute(&mut *tx)
    .await?;

    if let Some(guild_id_i64) = guild_id_i64 {
        sqlx::query(
            "INSERT INTO guild_command_stats (guild_id, command_name, command_type, uses) VALUES ($1, $2, $3, 1)
             ON CONFLICT (guild_id, command_name, command_type)
             DO UPDATE SET uses = guild_command_stats.uses + 1",
        )
        .bind(guild_id_i64)
        .bind(command_name)
        .bind(command_type)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn command_stats(db: &Database, command_name: &str) -> anyhow::Result<CommandStats> {
    let created_at: Option<i64> =
        sqlx::query_scalar("SELECT created_at FROM command_first_use WHERE command_name = $1")
            .bind(command_name)
            .fetch_optional(db.pool())
            .await?;

    let rows: Vec<UsageRow> =
        sqlx::query_as("SELECT command_type, uses FROM command_stats WHERE command_name = $1")
            .bind(command_name)
            .fetch_all(db.pool())
            .await?;

    let mut stats = CommandStats {
        created_at: created_at
            .map(u64::try_from)
            .transpose()
            .context("created_at row out of u64 range")?,
        ..CommandStats::default()
    };

    for row in rows {
        let uses = u64::try_from(row.uses).context("uses row out of u64 range")?;
        match row.command_type.as_str() {
            "slash" => stats.slash_uses = uses,
            "prefix" => stats.prefix_uses = uses,
            _ => {}
        }
    }

    Ok(stats)
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
