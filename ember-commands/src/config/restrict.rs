use ember_core::{CommandType, Translator};
use ember_database::impls::restrictions::{
    add_command_restriction, get_command_restriction, list_command_restrictions,
    remove_command_restriction,
};
use ember_database::model::restrictions::{CommandRestriction, RestrictionScope, RestrictionTarget};
use ember_utils::embed::{error_embed, info_embed};
use serenity::all::{ChannelType, CommandOptionType, Permissions};

use crate::framework::help::command_name_suggestions;
use crate::framework::{
    AutocompleteSource, Command, CommandConfig, CommandContext, CommandPermissions, CommandResult,
    OptionConfig, Reply,
};

pub fn restrict() -> Command {
    Command::new(CommandConfig {
        name: "restrict".to_owned(),
        category: "config".to_owned(),
        types: vec![CommandType::Slash],
        permissions: CommandPermissions {
            client: Permissions::empty(),
            user: Permissions::MANAGE_GUILD,
        },
        ephemeral_defer: true,
        beta: true,
        options: vec![
            OptionConfig {
                options: target_options(),
                run: Some(run_add),
                ..OptionConfig::new("add", CommandOptionType::SubCommand)
            },
            OptionConfig {
                options: target_options(),
                run: Some(run_remove),
                ..OptionConfig::new("remove", CommandOptionType::SubCommand)
            },
            OptionConfig {
                options: vec![command_option(false)],
                run: Some(run_list),
                ..OptionConfig::new("list", CommandOptionType::SubCommand)
            },
        ],
        ..CommandConfig::default()
    })
}

fn command_option(required: bool) -> OptionConfig {
    OptionConfig {
        required,
        strict_autocomplete: true,
        autocomplete_options: Some(AutocompleteSource::Provider(command_name_suggestions)),
        ..OptionConfig::new("command", CommandOptionType::String)
    }
}

fn target_options() -> Vec<OptionConfig> {
    vec![
        command_option(true),
        OptionConfig::new("user", CommandOptionType::User),
        OptionConfig {
            channel_types: vec![ChannelType::Text, ChannelType::News, ChannelType::Voice],
            ..OptionConfig::new("channel", CommandOptionType::Channel)
        },
        OptionConfig::new("role", CommandOptionType::Role),
    ]
}

/// Targets named in the invocation. Without any, the whole guild is meant.
fn targets(ctx: &CommandContext<'_>) -> Vec<(RestrictionScope, RestrictionTarget)> {
    let named: Vec<_> = [
        ("user", RestrictionScope::User),
        ("channel", RestrictionScope::Channel),
        ("role", RestrictionScope::Role),
    ]
    .into_iter()
    .filter_map(|(option, scope)| {
        ctx.id_argument(option)
            .map(|id| (scope, RestrictionTarget::Id(id)))
    })
    .collect();

    if named.is_empty() {
        vec![(RestrictionScope::User, RestrictionTarget::Everyone)]
    } else {
        named
    }
}

fn run_add(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move { change(&ctx, true).await })
}

fn run_remove(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move { change(&ctx, false).await })
}

async fn change(ctx: &CommandContext<'_>, add: bool) -> anyhow::Result<()> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let name = ctx
        .str_argument("command")
        .map(str::to_lowercase)
        .unwrap_or_default();
    let Some(command) = ctx.registry.resolve(&name) else {
        let notice = error_embed(ctx.lang.t_with("notFound", &[("command", &name)]));
        return ctx.reply(Reply::embed(notice).ephemeral(true)).await;
    };

    if command.name == ctx.command.original_name() {
        let notice = error_embed(ctx.lang.t("cannotRestrictSelf"));
        return ctx.reply(Reply::embed(notice).ephemeral(true)).await;
    }

    let mut changed = 0_usize;
    for (scope, target) in targets(ctx) {
        let done = if add {
            add_command_restriction(&ctx.data.db, guild_id, &command.name, scope, target).await?
        } else {
            remove_command_restriction(&ctx.data.db, guild_id, &command.name, scope, target)
                .await?
        };
        changed += usize::from(done);
    }

    let text = change_reply(&ctx.lang, add, &command.name, changed);
    ctx.reply(Reply::text(text).ephemeral(true)).await
}

/// Outcome of an add or remove that touched `changed` entries.
fn change_reply(lang: &Translator, add: bool, command: &str, changed: usize) -> String {
    let key = match (add, changed) {
        (_, 0) => "unchanged",
        (true, _) => "added",
        (false, _) => "removed",
    };
    lang.t_with(key, &[("command", command), ("count", &changed.to_string())])
}

fn mention(scope: RestrictionScope, target: RestrictionTarget, everyone: &str) -> String {
    match (scope, target) {
        (_, RestrictionTarget::Everyone) => everyone.to_owned(),
        (RestrictionScope::User, RestrictionTarget::Id(id)) => format!("<@{id}>"),
        (RestrictionScope::Channel, RestrictionTarget::Id(id)) => format!("<#{id}>"),
        (RestrictionScope::Role, RestrictionTarget::Id(id)) => format!("<@&{id}>"),
    }
}

/// Labels for the user, channel and role lines of a listing.
pub struct ScopeLabels<'a> {
    pub users: &'a str,
    pub channels: &'a str,
    pub roles: &'a str,
    pub everyone: &'a str,
}

/// One line per non-empty scope, e.g. `Users: <@1>, <@2>`.
fn restriction_lines(restriction: &CommandRestriction, labels: &ScopeLabels<'_>) -> String {
    [
        (labels.users, RestrictionScope::User, &restriction.users),
        (labels.channels, RestrictionScope::Channel, &restriction.channels),
        (labels.roles, RestrictionScope::Role, &restriction.roles),
    ]
    .into_iter()
    .filter(|(_, _, targets)| !targets.is_empty())
    .map(|(label, scope, targets)| {
        let mentions = targets
            .iter()
            .map(|target| mention(scope, *target, labels.everyone))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{label}: {mentions}")
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn run_list(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let restrictions = match ctx.str_argument("command").map(str::to_lowercase) {
            Some(name) => {
                let restriction = get_command_restriction(&ctx.data.db, guild_id, &name).await?;
                if restriction.is_empty() {
                    Vec::new()
                } else {
                    vec![(name, restriction)]
                }
            }
            None => list_command_restrictions(&ctx.data.db, guild_id).await?,
        };

        if restrictions.is_empty() {
            return ctx
                .reply(Reply::text(ctx.lang.t("list.empty")).ephemeral(true))
                .await;
        }

        let (users, channels, roles, everyone) = (
            ctx.lang.t("list.users"),
            ctx.lang.t("list.channels"),
            ctx.lang.t("list.roles"),
            ctx.lang.t("list.everyone"),
        );
        let labels = ScopeLabels {
            users: &users,
            channels: &channels,
            roles: &roles,
            everyone: &everyone,
        };

        let embed = restrictions.iter().fold(
            info_embed(
                ctx.lang.t("list.embedTitle"),
                ctx.lang.t("list.embedDescription"),
                None,
            ),
            |embed, (name, restriction)| {
                embed.field(name, restriction_lines(restriction, &labels), false)
            },
        );

        ctx.reply(Reply::embed(embed).ephemeral(true)).await
    })
}
