use std::time::Duration;

use ember_core::{CommandType, Cooldowns};
use ember_utils::embed::{error_embed, info_embed};
use ember_utils::formatting::{command_mention, format_compact_duration};
use serenity::all::{CommandOptionType, CreateEmbed};

use crate::framework::help::{command_list, command_listing, command_name_suggestions};
use crate::framework::permissions::translate_permissions;
use crate::framework::{
    Aliases, AutocompleteSource, Command, CommandConfig, CommandContext, CommandResult,
    OptionConfig, Reply,
};
use crate::utility::embeds::{DetailLabels, category_field_value, command_detail_fields};

pub fn help() -> Command {
    Command::new(CommandConfig {
        name: "help".to_owned(),
        category: "utility".to_owned(),
        types: vec![CommandType::Slash, CommandType::Prefix],
        aliases: Aliases {
            slash: Vec::new(),
            prefix: vec!["h".to_owned(), "commands".to_owned()],
        },
        dm_permission: true,
        beta: true,
        options: vec![OptionConfig {
            autocomplete_options: Some(AutocompleteSource::Provider(command_name_suggestions)),
            ..OptionConfig::new("command", CommandOptionType::String)
        }],
        run: Some(run),
        ..CommandConfig::default()
    })
}

fn run(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move {
        let embed = match ctx.str_argument("command") {
            Some(query) => command_embed(&ctx, query),
            None => overview_embed(&ctx),
        };

        ctx.reply(Reply::embed(embed)).await
    })
}

fn overview_embed(ctx: &CommandContext<'_>) -> CreateEmbed {
    let settings = &ctx.data.settings;
    let categories = command_list(ctx.registry, &ctx.lang, settings);

    if categories.is_empty() {
        return error_embed(ctx.lang.t("all.noCommands"));
    }

    let description = ctx
        .lang
        .t_with("all.embedDescription", &[("prefix", &settings.prefix)]);

    categories.iter().fold(
        info_embed(ctx.lang.t("all.embedTitle"), description, None),
        |embed, category| embed.field(&category.category, category_field_value(category), false),
    )
}

/// The longest active cooldown scope, if any.
fn longest_cooldown(cooldowns: Cooldowns) -> Option<Duration> {
    [cooldowns.guild, cooldowns.channel, cooldowns.user]
        .into_iter()
        .max()
        .filter(|duration| !duration.is_zero())
}

fn command_embed(ctx: &CommandContext<'_>, query: &str) -> CreateEmbed {
    let settings = &ctx.data.settings;
    let name = query
        .trim()
        .trim_start_matches(settings.prefix.as_str())
        .to_lowercase();

    let visible = ctx.registry.resolve(&name).filter(|command| {
        !command.disabled
            && (!settings.is_dev_only(&command.category) || settings.is_owner(ctx.author_id()))
    });
    let Some(command) = visible else {
        return error_embed(ctx.lang.t_with("one.notFound", &[("command", &name)]));
    };

    let entry = command_listing(&command, &ctx.lang, &settings.prefix);
    let labels = DetailLabels {
        usage: ctx.lang.t("one.usage"),
        aliases: ctx.lang.t("one.aliases"),
        permissions: ctx.lang.t("one.permissions"),
        cooldown: ctx.lang.t("one.cooldown"),
    };
    let permissions = translate_permissions(command.permissions.user, &ctx.lang);
    let cooldown = longest_cooldown(command.cooldowns)
        .map(|duration| format_compact_duration(duration.as_secs()));
    let none = ctx.lang.t("global.none");

    let mut description = entry.description.clone();
    if command.is_slash() {
        description.push_str("\n\n");
        description.push_str(&command_mention(&command.name, command.command_id));
    }

    command_detail_fields(&entry, &labels, &permissions, cooldown, &none)
        .into_iter()
        .fold(
            info_embed(&entry.name, description, None),
            |embed, (name, value)| embed.field(name, value, false),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_cooldown_ignores_zero_scopes() {
        assert_eq!(longest_cooldown(Cooldowns::default()), None);
        assert_eq!(
            longest_cooldown(Cooldowns {
                guild: Duration::from_secs(3),
                channel: Duration::ZERO,
                user: Duration::from_secs(10),
            }),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn help_declares_an_autocompleted_command_option() {
        let command = help();
        assert_eq!(command.options.len(), 1);
        assert!(command.options[0].autocomplete());
        assert!(!command.options[0].strict_autocomplete);
    }
}
