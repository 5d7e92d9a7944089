use anyhow::Context as _;
use tracing::warn;

use crate::cache::{RESTRICTION_CACHE_TTL, command_restriction_key, invalidate_command_restriction};
use crate::database::Database;
use crate::model::restrictions::{CommandRestriction, RestrictionScope, RestrictionTarget};

#[derive(sqlx::FromRow)]
struct RestrictionRow {
    scope: String,
    target_id: i64,
}

#[derive(sqlx::FromRow)]
struct GuildRestrictionRow {
    command_name: String,
    scope: String,
    target_id: i64,
}

pub async fn get_command_restriction(
    db: &Database,
    guild_id: u64,
    command_name: &str,
) -> anyhow::Result<CommandRestriction> {
    let cache_key = command_restriction_key(db.cache(), guild_id, command_name);
    db.cache()
        .get_or_load_json(&cache_key, RESTRICTION_CACHE_TTL, || async {
            let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

            let rows: Vec<RestrictionRow> = sqlx::query_as(
                "SELECT scope, target_id FROM guild_command_restrictions
                 WHERE guild_id = $1 AND command_name = $2",
            )
            .bind(guild_id_i64)
            .bind(command_name)
            .fetch_all(db.pool())
            .await?;

            let mut restriction = CommandRestriction::default();
            for row in rows {
                let Some(scope) = RestrictionScope::parse(&row.scope) else {
                    warn!(scope = %row.scope, guild_id, command_name, "unknown restriction scope");
                    continue;
                };
                let target_id =
                    u64::try_from(row.target_id).context("target_id row out of u64 range")?;
                restriction.push(scope, RestrictionTarget::from_column(target_id));
            }

            Ok(restriction)
        })
        .await
}

/// The write already happened; a stale cache entry only lives until its TTL.
async fn forget_cached_restriction(db: &Database, guild_id: u64, command_name: &str) {
    if let Err(error) = invalidate_command_restriction(db.cache(), guild_id, command_name).await {
        warn!(?error, guild_id, command_name, "failed to invalidate cached command restriction");
    }
}

pub async fn add_command_restriction(
    db: &Database,
    guild_id: u64,
    command_name: &str,
    scope: RestrictionScope,
    target: RestrictionTarget,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_i64 = i64::try_from(target.to_column()).context("target_id out of i64 range")?;

    let inserted = sqlx::query(
        "INSERT INTO guild_command_restrictions (guild_id, command_name, scope, target_id)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT DO NOTHING",
    )
    .bind(guild_id_i64)
    .bind(command_name)
    .bind(scope.as_str())
    .bind(target_i64)
    .execute(db.pool())
    .await?
    .rows_affected();

    forget_cached_restriction(db, guild_id, command_name).await;

    Ok(inserted > 0)
}

pub async fn remove_command_restriction(
    db: &Database,
    guild_id: u64,
    command_name: &str,
    scope: RestrictionScope,
    target: RestrictionTarget,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let target_i64 = i64::try_from(target.to_column()).context("target_id out of i64 range")?;

    let deleted = sqlx::query(
        "DELETE FROM guild_command_restrictions
         WHERE guild_id = $1 AND command_name = $2 AND scope = $3 AND target_id = $4",
    )
    .bind(guild_id_i64)
    .bind(command_name)
    .bind(scope.as_str())
    .bind(target_i64)
    .execute(db.pool())
    .await?
    .rows_affected();

    forget_cached_restriction(db, guild_id, command_name).await;

    Ok(deleted > 0)
}

/// Every restricted command of a guild, ordered by command name. Not cached.
pub async fn list_command_restrictions(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<Vec<(String, CommandRestriction)>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let rows: Vec<GuildRestrictionRow> = sqlx::query_as(
        "SELECT command_name, scope, target_id FROM guild_command_restrictions
         WHERE guild_id = $1
         ORDER BY command_name, scope, target_id",
    )
    .bind(guild_id_i64)
    .fetch_all(db.pool())
    .await?;

    let mut restrictions: Vec<(String, CommandRestriction)> = Vec::new();
    for row in rows {
        let Some(scope) = RestrictionScope::parse(&row.scope) else {
            warn!(scope = %row.scope, guild_id, command_name = %row.command_name, "unknown restriction scope");
            continue;
        };
        let target_id = u64::try_from(row.target_id).context("target_id row out of u64 range")?;

        let target = RestrictionTarget::from_column(target_id);

        if let Some((command_name, restriction)) = restrictions.last_mut()
            && *command_name == row.command_name
        {
            restriction.push(scope, target);
            continue;
        }

        let mut restriction = CommandRestriction::default();
        restriction.push(scope, target);
        restrictions.push((row.command_name, restriction));
    }

    Ok(restrictions)
}
