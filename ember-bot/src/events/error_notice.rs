use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateMessage, Message,
};
use tracing::warn;

use ember_core::i18n::negotiate_locale;
use ember_core::{Data, Translator};
use ember_utils::embed::error_embed;

fn error_text(data: &Data, locale: &str) -> String {
    let locale = negotiate_locale(locale, data.i18n.as_ref());
    Translator::new(data.i18n.clone(), locale)
        .with_backup_path("events.command")
        .t("error")
}

/// Tell the caller their slash command failed. The interaction may or may
/// not have been answered yet, so a followup is tried second.
pub async fn notify_interaction(ctx: &Context, data: &Data, interaction: &CommandInteraction) {
    let embed = error_embed(error_text(data, &interaction.locale));

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed.clone())
            .ephemeral(true),
    );
    if interaction.create_response(ctx, response).await.is_ok() {
        return;
    }

    let followup = CreateInteractionResponseFollowup::new()
        .embed(embed)
        .ephemeral(true);
    if let Err(err) = interaction.create_followup(ctx, followup).await {
        warn!(?err, "failed to send command error notice");
    }
}

pub async fn notify_message(ctx: &Context, data: &Data, message: &Message) {
    let embed = error_embed(error_text(data, data.i18n.default_locale()));

    let builder = CreateMessage::new().embed(embed).reference_message(message);
    if let Err(err) = message.channel_id.send_message(ctx, builder).await {
        warn!(?err, "failed to send command error notice");
    }
}
