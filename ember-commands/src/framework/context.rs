use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use ember_core::{CommandType, Data, Translator};
use ember_utils::permissions::resolve_channel_permissions;
use serenity::all::{
    CommandInteraction, Context, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage,
    EditInteractionResponse, Message, Permissions,
};
use tracing::debug;

use super::arguments::{
    ArgumentValue, Arguments, InvocationPath, map_prefix_arguments, parse_interaction_options,
};
use super::command::Command;
use super::registry::CommandRegistry;

pub type CommandResult<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Handler of a command or subcommand.
pub type RunFn = for<'a> fn(CommandContext<'a>) -> CommandResult<'a>;

/// Where an invocation came from.
pub enum CommandSource<'a> {
    Slash(&'a CommandInteraction),
    Prefix {
        message: &'a Message,
        args: Vec<String>,
    },
}

impl CommandSource<'_> {
    pub fn kind(&self) -> CommandType {
        match self {
            Self::Slash(_) => CommandType::Slash,
            Self::Prefix { .. } => CommandType::Prefix,
        }
    }
}

/// Everything the checks need to know about one invocation.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub kind: CommandType,
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub role_ids: Vec<u64>,
    /// `None` when unknown, which skips the member permission check.
    pub user_permissions: Option<Permissions>,
    pub bot_permissions: Option<Permissions>,
    pub locale: String,
    pub path: InvocationPath,
    pub arguments: Arguments,
}

impl Invocation {
    pub fn from_interaction(interaction: &CommandInteraction) -> Self {
        let (path, arguments) = parse_interaction_options(&interaction.data.options);
        let member = interaction.member.as_deref();

        Self {
            kind: CommandType::Slash,
            user_id: interaction.user.id.get(),
            guild_id: interaction.guild_id.map(|id| id.get()),
            channel_id: interaction.channel_id.get(),
            role_ids: member
                .map(|member| member.roles.iter().map(|role| role.get()).collect())
                .unwrap_or_default(),
            user_permissions: member.and_then(|member| member.permissions),
            bot_permissions: interaction.app_permissions,
            locale: interaction.locale.clone(),
            path,
            arguments,
        }
    }

    /// Build from a prefix message. Channel permissions come from the cached
    /// guild; failures leave them unknown.
    pub async fn from_message(
        serenity: &Context,
        message: &Message,
        command: &Command,
        args: &[String],
        default_locale: &str,
    ) -> Self {
        let (path, arguments) = map_prefix_arguments(&command.options, args);

        let mut invocation = Self {
            kind: CommandType::Prefix,
            user_id: message.author.id.get(),
            guild_id: message.guild_id.map(|id| id.get()),
            channel_id: message.channel_id.get(),
            role_ids: message
                .member
                .as_ref()
                .map(|member| member.roles.iter().map(|role| role.get()).collect())
                .unwrap_or_default(),
            user_permissions: None,
            bot_permissions: None,
            locale: default_locale.to_owned(),
            path,
            arguments,
        };

        let Some(guild_id) = message.guild_id else {
            return invocation;
        };

        if let Some(locale) = serenity
            .cache
            .guild(guild_id)
            .map(|guild| guild.preferred_locale.clone())
        {
            invocation.locale = locale;
        }

        let channel_id = message.channel_id;
        let bot_id = serenity.cache.current_user().id;

        let author_id = message.author.id;
        match resolve_channel_permissions(serenity, guild_id, channel_id, author_id).await {
            Ok(perms) => invocation.user_permissions = Some(perms),
            Err(error) => debug!(?error, "could not resolve member permissions"),
        }
        match resolve_channel_permissions(serenity, guild_id, channel_id, bot_id).await {
            Ok(perms) => invocation.bot_permissions = Some(perms),
            Err(error) => debug!(?error, "could not resolve bot permissions"),
        }

        invocation
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentValue> {
        self.arguments
            .iter()
            .find(|(argument, _)| argument == name)
            .map(|(_, value)| value)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Reply {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: CreateEmbed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

/// Send `reply` to wherever `source` came from. Slash replies edit the
/// deferred response first and use followups after that.
pub(crate) async fn send_reply(
    serenity: &Context,
    source: &CommandSource<'_>,
    reply: Reply,
    deferred: bool,
    replied: &AtomicBool,
) -> anyhow::Result<Option<Message>> {
    let already_replied = replied.swap(true, Ordering::SeqCst);

    let message = match source {
        CommandSource::Slash(interaction) if already_replied => {
            let mut builder = CreateInteractionResponseFollowup::new()
                .embeds(reply.embeds)
                .ephemeral(reply.ephemeral);
            if let Some(content) = reply.content {
                builder = builder.content(content);
            }
            Some(interaction.create_followup(serenity, builder).await?)
        }
        CommandSource::Slash(interaction) if deferred => {
            let mut builder = EditInteractionResponse::new().embeds(reply.embeds);
            if let Some(content) = reply.content {
                builder = builder.content(content);
            }
            Some(interaction.edit_response(serenity, builder).await?)
        }
        CommandSource::Slash(interaction) => {
            let mut builder = CreateInteractionResponseMessage::new()
                .embeds(reply.embeds)
                .ephemeral(reply.ephemeral);
            if let Some(content) = reply.content {
                builder = builder.content(content);
            }
            interaction
                .create_response(serenity, CreateInteractionResponse::Message(builder))
                .await?;
            None
        }
        CommandSource::Prefix { message, .. } => {
            let mut builder = CreateMessage::new()
                .embeds(reply.embeds)
                .reference_message(*message);
            if let Some(content) = reply.content {
                builder = builder.content(content);
            }
            Some(message.channel_id.send_message(serenity, builder).await?)
        }
    };

    Ok(message)
}

/// Handed to run handlers.
pub struct CommandContext<'a> {
    pub serenity: &'a Context,
    pub data: &'a Data,
    pub registry: &'a CommandRegistry,
    pub command: &'a Command,
    pub source: &'a CommandSource<'a>,
    pub invocation: &'a Invocation,
    /// Translator rooted at the command's translation keys.
    pub lang: Translator,
    deferred: bool,
    replied: AtomicBool,
}

impl<'a> CommandContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        serenity: &'a Context,
        data: &'a Data,
        registry: &'a CommandRegistry,
        command: &'a Command,
        source: &'a CommandSource<'a>,
        invocation: &'a Invocation,
        lang: Translator,
        deferred: bool,
    ) -> Self {
        Self {
            serenity,
            data,
            registry,
            command,
            source,
            invocation,
            lang,
            deferred,
            replied: AtomicBool::new(false),
        }
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentValue> {
        self.invocation.argument(name)
    }

    pub fn str_argument(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(ArgumentValue::as_str)
    }

    pub fn id_argument(&self, name: &str) -> Option<u64> {
        self.argument(name).and_then(ArgumentValue::as_id)
    }

    pub fn guild_id(&self) -> Option<u64> {
        self.invocation.guild_id
    }

    pub fn author_id(&self) -> u64 {
        self.invocation.user_id
    }

    pub async fn reply(&self, reply: Reply) -> anyhow::Result<()> {
        send_reply(self.serenity, self.source, reply, self.deferred, &self.replied).await?;
        Ok(())
    }

    pub async fn say(&self, content: impl Into<String>) -> anyhow::Result<()> {
        self.reply(Reply::text(content)).await
    }
}
