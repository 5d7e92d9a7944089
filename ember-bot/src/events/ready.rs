use serenity::all::{Context, Ready};
use tracing::{error, info};

use ember_commands::framework::{CommandRegistry, CommandScope, sync_application_commands};
use ember_core::Data;

/// Bring the registered application commands in line with the registry.
pub async fn handle_ready(ctx: &Context, data: &Data, registry: &CommandRegistry, ready: &Ready) {
    info!(user = %ready.user.name, guilds = ready.guilds.len(), "Ember has awoken!");

    let scope = CommandScope::new(ctx.http.clone(), data.settings.dev_guild_id);
    match sync_application_commands(registry, &scope).await {
        Ok(summary) => info!(
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            deleted = summary.deleted,
            "Application commands synced."
        ),
        Err(err) => error!(?err, "failed to sync application commands"),
    }
}
