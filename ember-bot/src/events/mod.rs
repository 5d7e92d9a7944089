mod error_notice;
mod ready;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{Context, EventHandler, Interaction, Message, Ready};
use tracing::error;

use ember_commands::framework::{
    CommandRegistry, dispatch_autocomplete, dispatch_prefix, dispatch_slash,
};
use ember_core::Data;

pub struct Handler {
    data: Data,
    registry: Arc<CommandRegistry>,
    synced: AtomicBool,
}

impl Handler {
    pub fn new(data: Data, registry: CommandRegistry) -> Self {
        Self {
            data,
            registry: Arc::new(registry),
            synced: AtomicBool::new(false),
        }
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        // Ready fires again after every reconnect; commands only sync once.
        if self.synced.swap(true, Ordering::SeqCst) {
            return;
        }

        ready::handle_ready(&ctx, &self.data, &self.registry, &ready).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                if let Err(err) = dispatch_slash(&ctx, &self.data, &self.registry, &command).await
                {
                    error!(?err, "slash command failed");
                    error_notice::notify_interaction(&ctx, &self.data, &command).await;
                }
            }
            Interaction::Autocomplete(autocomplete) => {
                if let Err(err) =
                    dispatch_autocomplete(&ctx, &self.data, &self.registry, &autocomplete).await
                {
                    error!(?err, command = %autocomplete.data.name, "autocomplete failed");
                }
            }
            _ => {}
        }
    }

    async fn message(&self, ctx: Context, new_message: Message) {
        if let Err(err) = dispatch_prefix(&ctx, &self.data, &self.registry, &new_message).await {
            error!(?err, "prefix command failed");
            error_notice::notify_message(&ctx, &self.data, &new_message).await;
        }
    }
}
