use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use ember_core::{CommandType, I18nProvider};
use serenity::all::{CommandId, GuildId, Http};
use tracing::{debug, info};

use super::command::Command;
use super::payload::{CommandPayload, RegisteredCommand};
use super::registry::CommandRegistry;

/// The slice of the Discord API that manages application commands.
pub trait ApplicationCommands: Send + Sync {
    fn fetch(&self) -> impl Future<Output = anyhow::Result<Vec<RegisteredCommand>>> + Send;

    fn create(
        &self,
        payload: &CommandPayload,
    ) -> impl Future<Output = anyhow::Result<RegisteredCommand>> + Send;

    fn edit(
        &self,
        command_id: u64,
        payload: &CommandPayload,
    ) -> impl Future<Output = anyhow::Result<RegisteredCommand>> + Send;

    fn delete(&self, command_id: u64) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Guild commands carry no DM setting; Discord omits `dm_permission` for them.
    fn guild_scoped(&self) -> bool {
        false
    }
}

/// Global application commands of the bot.
#[derive(Clone)]
pub struct GlobalCommands {
    http: Arc<Http>,
}

impl GlobalCommands {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl ApplicationCommands for GlobalCommands {
    async fn fetch(&self) -> anyhow::Result<Vec<RegisteredCommand>> {
        self.http
            .get_global_commands_with_localizations()
            .await?
            .iter()
            .map(RegisteredCommand::from_model)
            .collect()
    }

    async fn create(&self, payload: &CommandPayload) -> anyhow::Result<RegisteredCommand> {
        let command = self.http.create_global_command(payload).await?;
        RegisteredCommand::from_model(&command)
    }

    async fn edit(
        &self,
        command_id: u64,
        payload: &CommandPayload,
    ) -> anyhow::Result<RegisteredCommand> {
        let command = self
            .http
            .edit_global_command(CommandId::new(command_id), payload)
            .await?;
        RegisteredCommand::from_model(&command)
    }

    async fn delete(&self, command_id: u64) -> anyhow::Result<()> {
        self.http
            .delete_global_command(CommandId::new(command_id))
            .await?;
        Ok(())
    }
}

/// Application commands registered in one guild, for development bots.
#[derive(Clone)]
pub struct GuildCommands {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl GuildCommands {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

impl ApplicationCommands for GuildCommands {
    async fn fetch(&self) -> anyhow::Result<Vec<RegisteredCommand>> {
        self.http
            .get_guild_commands_with_localizations(self.guild_id)
            .await?
            .iter()
            .map(RegisteredCommand::from_model)
            .collect()
    }

    async fn create(&self, payload: &CommandPayload) -> anyhow::Result<RegisteredCommand> {
        let command = self.http.create_guild_command(self.guild_id, payload).await?;
        RegisteredCommand::from_model(&command)
    }

    async fn edit(
        &self,
        command_id: u64,
        payload: &CommandPayload,
    ) -> anyhow::Result<RegisteredCommand> {
        let command = self
            .http
            .edit_guild_command(self.guild_id, CommandId::new(command_id), payload)
            .await?;
        RegisteredCommand::from_model(&command)
    }

    async fn delete(&self, command_id: u64) -> anyhow::Result<()> {
        self.http
            .delete_guild_command(self.guild_id, CommandId::new(command_id))
            .await?;
        Ok(())
    }

    fn guild_scoped(&self) -> bool {
        true
    }
}

/// Where the bot registers its commands: one guild or globally.
#[derive(Clone)]
pub enum CommandScope {
    Global(GlobalCommands),
    Guild(GuildCommands),
}

impl CommandScope {
    pub fn new(http: Arc<Http>, dev_guild_id: Option<u64>) -> Self {
        match dev_guild_id {
            Some(guild_id) => Self::Guild(GuildCommands::new(http, GuildId::new(guild_id))),
            None => Self::Global(GlobalCommands::new(http)),
        }
    }
}

impl ApplicationCommands for CommandScope {
    async fn fetch(&self) -> anyhow::Result<Vec<RegisteredCommand>> {
        match self {
            Self::Global(commands) => commands.fetch().await,
            Self::Guild(commands) => commands.fetch().await,
        }
    }

    async fn create(&self, payload: &CommandPayload) -> anyhow::Result<RegisteredCommand> {
        match self {
            Self::Global(commands) => commands.create(payload).await,
            Self::Guild(commands) => commands.create(payload).await,
        }
    }

    async fn edit(
        &self,
        command_id: u64,
        payload: &CommandPayload,
    ) -> anyhow::Result<RegisteredCommand> {
        match self {
            Self::Global(commands) => commands.edit(command_id, payload).await,
            Self::Guild(commands) => commands.edit(command_id, payload).await,
        }
    }

    async fn delete(&self, command_id: u64) -> anyhow::Result<()> {
        match self {
            Self::Global(commands) => commands.delete(command_id).await,
            Self::Guild(commands) => commands.delete(command_id).await,
        }
    }

    fn guild_scoped(&self) -> bool {
        matches!(self, Self::Guild(_))
    }
}

fn log_load_message(action: &str, name: &str, alias_of: Option<&str>) {
    match alias_of {
        Some(original) => info!("{action} Slash Command {name} (Alias of {original})"),
        None => info!("{action} Slash Command {name}"),
    }
}

fn find_by_name<'r>(registered: &'r [RegisteredCommand], name: &str) -> Option<&'r RegisteredCommand> {
    registered.iter().find(|command| command.name() == name)
}

/// Payload of `command` under `name` as `application` stores it.
fn payload_for<A: ApplicationCommands>(
    application: &A,
    command: &Command,
    name: &str,
) -> CommandPayload {
    let mut payload = command.to_payload_named(name);
    if application.guild_scoped() {
        payload.dm_permission = None;
    }
    payload
}

/// Edit the registered command named like `payload`, or create it.
async fn upsert<A: ApplicationCommands>(
    application: &A,
    registered: &[RegisteredCommand],
    payload: &CommandPayload,
    alias_of: Option<&str>,
) -> anyhow::Result<RegisteredCommand> {
    match find_by_name(registered, &payload.name) {
        Some(existing) => {
            let updated = application.edit(existing.id, payload).await?;
            log_load_message("Reloaded", &payload.name, alias_of);
            Ok(updated)
        }
        None => {
            let created = application.create(payload).await?;
            log_load_message("Created", &payload.name, alias_of);
            Ok(created)
        }
    }
}

impl Command {
    /// Rebuild this command from its constructor with fresh translations and
    /// bring its application command in line with the result.
    pub async fn reload<A: ApplicationCommands>(
        &self,
        application: &A,
        i18n: &Arc<dyn I18nProvider>,
    ) -> anyhow::Result<Command> {
        i18n.load_all_locales()?;

        let constructor = self
            .constructor()
            .ok_or_else(|| anyhow!("command {} cannot be rebuilt", self.id))?;
        let mut command = constructor().with_constructor(constructor).init(i18n)?;

        if self.is_slash() || command.is_slash() {
            let registered = self.reload_application_command(application, &command).await?;
            command.command_id = registered.map(|registered| registered.id);
        }

        Ok(command)
    }

    /// Reconcile the registered command (and slash aliases) of `self` with
    /// its replacement `new`. Returns the registered primary command, if any.
    pub async fn reload_application_command<A: ApplicationCommands>(
        &self,
        application: &A,
        new: &Command,
    ) -> anyhow::Result<Option<RegisteredCommand>> {
        let registered = application.fetch().await?;
        let is_equal = self.is_equal_to(new);
        let mut primary = None;

        if self.is_slash() && !new.is_slash() {
            if let Some(command_id) = self.command_id {
                application.delete(command_id).await?;
                log_load_message("Deleted", &self.name, None);
            }
        } else if new.is_slash() {
            let current = self
                .command_id
                .and_then(|id| registered.iter().find(|command| command.id == id));

            if new.disabled {
                if let Some(command_id) = self.command_id {
                    application.delete(command_id).await?;
                    log_load_message("Deleted Disabled", &self.name, None);
                }
            } else if let Some(current) = current.filter(|_| is_equal) {
                debug!(command = %new.name, "slash command unchanged");
                primary = Some(current.clone());
            } else {
                primary = Some(upsert(application, &registered, &payload_for(application, new, &new.name), None).await?);
            }
        }

        let mut aliases: Vec<&String> = Vec::new();
        for alias in self.aliases.slash.iter().chain(&new.aliases.slash) {
            if !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        for alias in aliases {
            let in_old = self.is_slash() && self.aliases.slash.contains(alias);
            let in_new = new.is_slash() && new.aliases.slash.contains(alias);
            let existing = find_by_name(&registered, alias);

            if !in_new {
                if let Some(existing) = existing.filter(|_| in_old) {
                    application.delete(existing.id).await?;
                    log_load_message("Deleted", alias, Some(&self.name));
                }
                continue;
            }

            if new.disabled {
                if let Some(existing) = existing {
                    application.delete(existing.id).await?;
                    log_load_message("Deleted Disabled", alias, Some(&self.name));
                }
                continue;
            }

            if is_equal && in_old && existing.is_some() {
                continue;
            }

            let payload = payload_for(application, new, alias);
            upsert(application, &registered, &payload, Some(&new.name)).await?;
        }

        Ok(primary)
    }
}

/// Counts of what [`sync_application_commands`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

/// Register every enabled slash command and slash alias, drop what no
/// declared command owns and store the resulting ids in the registry.
pub async fn sync_application_commands<A: ApplicationCommands>(
    registry: &CommandRegistry,
    application: &A,
) -> anyhow::Result<SyncSummary> {
    let registered = application.fetch().await?;
    let mut summary = SyncSummary::default();
    let mut handled = HashSet::new();

    for command in registry
        .commands()
        .into_iter()
        .filter(|command| command.supports(CommandType::Slash))
    {
        let names = std::iter::once(&command.name).chain(&command.aliases.slash);

        for name in names {
            let alias_of = (name != &command.name).then_some(command.name.as_str());
            let existing = find_by_name(&registered, name);

            if command.disabled {
                if let Some(existing) = existing {
                    application.delete(existing.id).await?;
                    handled.insert(existing.id);
                    summary.deleted += 1;
                    log_load_message("Deleted Disabled", name, alias_of);
                }
                continue;
            }

            let payload = payload_for(application, &command, name);
            let command_id = match existing {
                Some(existing) if payload.same_as(&existing.payload) => {
                    summary.unchanged += 1;
                    debug!(command = %name, "slash command unchanged");
                    existing.id
                }
                Some(existing) => {
                    let updated = application.edit(existing.id, &payload).await?;
                    summary.updated += 1;
                    log_load_message("Reloaded", name, alias_of);
                    updated.id
                }
                None => {
                    let created = application.create(&payload).await?;
                    summary.created += 1;
                    log_load_message("Created", name, alias_of);
                    created.id
                }
            };

            handled.insert(command_id);
            registry.set_command_id(name, command_id);
        }
    }

    for stale in registered.iter().filter(|command| !handled.contains(&command.id)) {
        application.delete(stale.id).await?;
        summary.deleted += 1;
        log_load_message("Deleted", stale.name(), None);
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        deleted = summary.deleted,
        "application commands synchronized"
    );

    Ok(summary)
}
