use std::sync::atomic::AtomicBool;

use anyhow::anyhow;
use ember_core::i18n::negotiate_locale;
use ember_core::{BotType, CommandType, Data, Translator};
use ember_database::impls::command_stats::{increment_command_use, record_first_use};
use ember_database::impls::restrictions::get_command_restriction;
use ember_utils::embed::{error_embed, titled_error_embed};
use ember_utils::formatting::inline_code;
use ember_utils::parse::parse_prefix_invocation;
use serenity::all::{
    CommandInteraction, Context, CreateAutocompleteResponse, CreateEmbed,
    CreateInteractionResponse, CreateMessage, Message, Permissions, ReactionType, UserId,
};
use serenity::http::HttpError;
use tracing::{debug, warn};

use super::arguments::parse_interaction_options;
use super::autocomplete::AutocompleteQuery;
use super::checks::{CheckEnv, Denial, PermissionTarget};
use super::choice::ChoiceValue;
use super::command::Command;
use super::context::{CommandContext, CommandSource, Invocation, Reply, send_reply};
use super::error::CommandExecutionError;
use super::permissions::translate_permissions;
use super::registry::CommandRegistry;

/// Discord refuses direct messages to this user.
const CANNOT_SEND_MESSAGE_API_ERR: isize = 50_007;

/// Check, defer, run and account one invocation of `command`.
///
/// Denials are answered here and count as success. Anything failing after
/// the checks is wrapped in a [`CommandExecutionError`].
pub async fn run_wrapper(
    serenity: &Context,
    data: &Data,
    registry: &CommandRegistry,
    command: &Command,
    source: CommandSource<'_>,
) -> Result<(), CommandExecutionError> {
    let command_type = source.kind();
    let command_name = command.original_name();
    let fail = |error: anyhow::Error| CommandExecutionError::new(command_name, command_type, error);

    let invocation = match &source {
        CommandSource::Slash(interaction) => Invocation::from_interaction(interaction),
        CommandSource::Prefix { message, args } => {
            Invocation::from_message(serenity, message, command, args, data.i18n.default_locale())
                .await
        }
    };

    let locale = negotiate_locale(&invocation.locale, data.i18n.as_ref());
    let lang = Translator::new(data.i18n.clone(), locale.clone()).with_backup_path("events.command");

    let restriction = match invocation.guild_id {
        Some(guild_id) => match get_command_restriction(&data.db, guild_id, command_name).await {
            Ok(restriction) => Some(restriction),
            Err(error) => {
                warn!(?error, guild_id, command = command_name, "failed to load command restriction");
                None
            }
        },
        None => None,
    };

    let env = CheckEnv {
        settings: &data.settings,
        cooldowns: &data.cooldowns,
        restriction: restriction.as_ref(),
        i18n: &data.i18n,
        registry,
        data: Some(data),
    };

    if let Err(denial) = command.is_runnable(&invocation, &env).await {
        debug!(command = command_name, ?denial, "command denied");
        return send_denial(serenity, &source, &invocation, &denial, &lang)
            .await
            .map_err(fail);
    }

    let cmd_lang = Translator::new(data.i18n.clone(), locale)
        .with_backup_path(format!("commands.{}.{command_name}", command.category));

    debug!("Executing {command_type} command {command_name}");

    let mut deferred = false;
    if let CommandSource::Slash(interaction) = &source
        && !command.no_defer
    {
        let result = if command.ephemeral_defer {
            interaction.defer_ephemeral(serenity).await
        } else {
            interaction.defer(serenity).await
        };
        result.map_err(|error| fail(error.into()))?;
        deferred = true;
    }

    let handler = command.run_handler(&invocation.path).ok_or_else(|| {
        fail(anyhow!(
            "no run handler for {}",
            invocation.path.display(&command.name)
        ))
    })?;

    let ctx = CommandContext::new(
        serenity,
        data,
        registry,
        command,
        &source,
        &invocation,
        cmd_lang,
        deferred,
    );
    handler(ctx).await.map_err(fail)?;

    record_usage(data, command_name, command_type, &invocation)
        .await
        .map_err(fail)
}

async fn record_usage(
    data: &Data,
    command_name: &str,
    command_type: CommandType,
    invocation: &Invocation,
) -> anyhow::Result<()> {
    record_first_use(&data.db, command_name).await?;

    if data.settings.bot_type == BotType::Dev {
        return Ok(());
    }

    increment_command_use(
        &data.db,
        command_name,
        command_type.as_str(),
        invocation.user_id,
        invocation.guild_id,
    )
    .await
}

fn permission_embed(missing: Permissions, target: PermissionTarget, lang: &Translator) -> CreateEmbed {
    let key = match target {
        PermissionTarget::User => "permissionDenied.embedDescriptionUser",
        PermissionTarget::Bot => "permissionDenied.embedDescriptionBot",
    };
    let permissions = translate_permissions(missing, lang)
        .iter()
        .map(|name| inline_code(name))
        .collect::<Vec<_>>()
        .join(", ");

    titled_error_embed(
        lang.t("permissionDenied.embedTitle"),
        lang.t_with(key, &[("permissions", &permissions)]),
    )
}

/// The notice for `denial`, or `None` when it is not answered.
fn denial_embed(denial: &Denial, lang: &Translator) -> Option<CreateEmbed> {
    match denial {
        Denial::MissingPermissions { missing, target, .. } => {
            Some(permission_embed(*missing, *target, lang))
        }
        other => other.message(lang).map(error_embed),
    }
}

async fn send_denial(
    serenity: &Context,
    source: &CommandSource<'_>,
    invocation: &Invocation,
    denial: &Denial,
    lang: &Translator,
) -> anyhow::Result<()> {
    let Some(embed) = denial_embed(denial, lang) else {
        return Ok(());
    };

    if let Denial::MissingPermissions {
        reply_in_channel: false,
        ..
    } = denial
    {
        return notify_in_dms(serenity, source, invocation, embed).await;
    }

    let replied = AtomicBool::new(false);
    send_reply(serenity, source, Reply::embed(embed).ephemeral(true), false, &replied).await?;
    Ok(())
}

fn cannot_send_dm(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.error.code == CANNOT_SEND_MESSAGE_API_ERR
    )
}

/// The bot cannot speak in the channel: mark the message and tell the user
/// privately instead.
async fn notify_in_dms(
    serenity: &Context,
    source: &CommandSource<'_>,
    invocation: &Invocation,
    embed: CreateEmbed,
) -> anyhow::Result<()> {
    let mut builder = CreateMessage::new().embed(embed);

    if let CommandSource::Prefix { message, .. } = source {
        let can_react = invocation.bot_permissions.is_some_and(|perms| {
            perms.intersects(Permissions::ADD_REACTIONS | Permissions::ADMINISTRATOR)
        });
        if can_react {
            message.react(serenity, '❌').await?;
            if let Err(error) = message
                .react(serenity, ReactionType::Unicode("✍️".to_owned()))
                .await
            {
                debug!(?error, "failed to add the second denial reaction");
            }
        }
        builder = builder.content(message.link());
    }

    match UserId::new(invocation.user_id)
        .direct_message(serenity, builder)
        .await
    {
        Ok(_) => Ok(()),
        Err(error) if cannot_send_dm(&error) => {
            debug!(user_id = invocation.user_id, "user does not accept direct messages");
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}

/// Route a slash command interaction to its command.
pub async fn dispatch_slash(
    serenity: &Context,
    data: &Data,
    registry: &CommandRegistry,
    interaction: &CommandInteraction,
) -> Result<(), CommandExecutionError> {
    let Some(command) = registry.slash_command(&interaction.data.name) else {
        warn!(command = %interaction.data.name, "received unknown slash command");
        return Ok(());
    };

    run_wrapper(serenity, data, registry, &command, CommandSource::Slash(interaction)).await
}

/// Route a message to the prefix command it invokes, if any.
pub async fn dispatch_prefix(
    serenity: &Context,
    data: &Data,
    registry: &CommandRegistry,
    message: &Message,
) -> Result<(), CommandExecutionError> {
    if message.author.bot {
        return Ok(());
    }

    let bot_id = serenity.cache.current_user().id.get();
    let Some(parsed) =
        parse_prefix_invocation(&message.content, &data.settings.prefix, Some(bot_id))
    else {
        return Ok(());
    };

    let Some(command) = registry.prefix_command(&parsed.name) else {
        debug!(command = %parsed.name, "unknown prefix command");
        return Ok(());
    };

    if data.settings.bot_type == BotType::Dev && !command.beta {
        debug!(command = %command.name, "skipping non-beta command on dev bot");
        return Ok(());
    }

    let source = CommandSource::Prefix {
        message,
        args: parsed.args,
    };
    run_wrapper(serenity, data, registry, &command, source).await
}

/// Answer an autocomplete interaction with suggestions for the focused option.
pub async fn dispatch_autocomplete(
    serenity: &Context,
    data: &Data,
    registry: &CommandRegistry,
    interaction: &CommandInteraction,
) -> anyhow::Result<()> {
    let Some(command) = registry.slash_command(&interaction.data.name) else {
        return Ok(());
    };
    let Some(focused) = interaction.data.autocomplete() else {
        return Ok(());
    };

    let (path, _) = parse_interaction_options(&interaction.data.options);
    let query = AutocompleteQuery {
        query: focused.value,
        locale: &interaction.locale,
        user_id: interaction.user.id.get(),
        guild_id: interaction.guild_id.map(|id| id.get()),
        registry,
        data: Some(data),
    };

    let suggestions = command
        .autocomplete_for(&path, focused.name, query, &data.i18n)
        .await?;

    let response = suggestions.into_iter().fold(
        CreateAutocompleteResponse::new(),
        |response, suggestion| match suggestion.value {
            ChoiceValue::String(value) => response.add_string_choice(suggestion.name, value),
            ChoiceValue::Integer(value) => response.add_int_choice(suggestion.name, value),
            ChoiceValue::Number(value) => response.add_number_choice(suggestion.name, value),
        },
    );

    interaction
        .create_response(serenity, CreateInteractionResponse::Autocomplete(response))
        .await?;
    Ok(())
}
