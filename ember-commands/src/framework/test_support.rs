//! Fixture commands and translations shared by the framework tests.

use std::sync::Arc;

use ember_core::{CommandType, I18nProvider, JsonI18n};
use serde_json::json;
use serenity::all::{CommandOptionType, Permissions};

use super::arguments::InvocationPath;
use super::autocomplete::AutocompleteSource;
use super::command::{Aliases, Command, CommandConfig, CommandPermissions};
use super::context::{CommandContext, CommandResult, Invocation};
use super::help::command_name_suggestions;
use super::option::OptionConfig;

pub(crate) fn i18n() -> Arc<dyn I18nProvider> {
    Arc::new(JsonI18n::from_values(
        "en",
        [
            (
                "en".to_owned(),
                json!({
                    "global": { "none": "None" },
                    "events": { "command": {
                        "disabled": "This command is disabled: {reason}",
                        "guildOnly": "This command can only be used in servers.",
                        "notAllowed": {
                            "user": "You are not allowed to use this command.",
                            "channel": "This command is not allowed in this channel.",
                            "role": "One of your roles is not allowed to use this command."
                        },
                        "strictAutocompleteNoMatch": "Invalid value for {option}.",
                        "strictAutocompleteNoMatchWValues": "Invalid value for {option}. Valid: {availableOptions}",
                        "cooldown": "Please wait {time} before using this again.",
                        "permissionDenied": {
                            "embedTitle": "Insufficient permissions",
                            "embedDescriptionUser": "You need: {permissions}",
                            "embedDescriptionBot": "I need: {permissions}"
                        }
                    } },
                    "others": {
                        "getCommands": {
                            "lookAtOptionDesc": "See the option descriptions. ",
                            "noInfo": "No information"
                        },
                        "Perms": {
                            "ManageGuild": "Manage Server",
                            "SendMessages": "Send Messages"
                        }
                    },
                    "commands": {
                        "fun": {
                            "categoryName": "Fun",
                            "roll": {
                                "description": "Roll a die",
                                "usage": { "usage": "<sides>" },
                                "options": { "sides": {
                                    "description": "Number of sides",
                                    "choices": { "6": "Six sides" }
                                } }
                            }
                        },
                        "config": {
                            "categoryName": "Configuration",
                            "restrict": {
                                "description": "Restrict who may use a command",
                                "added": "Added {count} restriction(s) to `{command}`.",
                                "removed": "Removed {count} restriction(s) from `{command}`.",
                                "unchanged": "Nothing changed for `{command}`.",
                                "options": {
                                    "add": {
                                        "description": "Add a restriction",
                                        "options": {
                                            "user": { "description": "User to block" },
                                            "role": { "description": "Role to block" }
                                        }
                                    },
                                    "list": { "description": "List restrictions" }
                                }
                            }
                        },
                        "owner": {
                            "secret": { "description": "Owner only" }
                        },
                        "utility": {
                            "usage": {
                                "description": "Show how a command is used",
                                "stats": "Used {uses} times since {since}",
                                "options": { "command": { "description": "Command name" } }
                            }
                        }
                    }
                }),
            ),
            (
                "de".to_owned(),
                json!({
                    "global": { "none": "Keine" },
                    "others": {
                        "getCommands": { "lookAtOptionDesc": "Siehe Optionsbeschreibungen. " },
                        "Perms": {
                            "ManageGuild": "Server verwalten",
                            "SendMessages": "Nachrichten senden"
                        }
                    },
                    "commands": {
                        "fun": {
                            "categoryName": "Spaß",
                            "roll": {
                                "description": "Würfeln",
                                "usage": { "usage": "<seiten>" },
                                "options": { "sides": {
                                    "description": "Anzahl der Seiten",
                                    "choices": { "6": "Sechs Seiten" }
                                } }
                            }
                        },
                        "config": { "categoryName": "Konfiguration" }
                    }
                }),
            ),
        ],
    ))
}

fn noop(_ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async { Ok(()) })
}

pub(crate) fn roll_config() -> CommandConfig {
    CommandConfig {
        name: "roll".to_owned(),
        category: "fun".to_owned(),
        types: vec![CommandType::Slash, CommandType::Prefix],
        aliases: Aliases {
            slash: vec!["r".to_owned()],
            prefix: vec!["Dice".to_owned()],
        },
        dm_permission: true,
        options: vec![OptionConfig {
            choices: vec![6.into(), 20.into()],
            ..OptionConfig::new("sides", CommandOptionType::Integer)
        }],
        run: Some(noop),
        ..CommandConfig::default()
    }
}

pub(crate) fn restrict_config() -> CommandConfig {
    CommandConfig {
        name: "restrict".to_owned(),
        category: "config".to_owned(),
        types: vec![CommandType::Slash],
        permissions: CommandPermissions {
            client: Permissions::empty(),
            user: Permissions::MANAGE_GUILD,
        },
        options: vec![
            OptionConfig {
                options: vec![
                    OptionConfig::new("user", CommandOptionType::User),
                    OptionConfig::new("role", CommandOptionType::Role),
                ],
                run: Some(noop),
                ..OptionConfig::new("add", CommandOptionType::SubCommand)
            },
            OptionConfig {
                run: Some(noop),
                ..OptionConfig::new("list", CommandOptionType::SubCommand)
            },
        ],
        ..CommandConfig::default()
    }
}

pub(crate) fn roll() -> Command {
    Command::new(roll_config())
}

pub(crate) fn restrict() -> Command {
    Command::new(restrict_config())
}

pub(crate) fn secret() -> Command {
    Command::new(CommandConfig {
        name: "secret".to_owned(),
        category: "owner".to_owned(),
        types: vec![CommandType::Prefix],
        run: Some(noop),
        ..CommandConfig::default()
    })
}

/// An initialized command with a strict autocomplete option over command names.
pub(crate) fn usage_like() -> Command {
    Command::new(CommandConfig {
        name: "usage".to_owned(),
        category: "utility".to_owned(),
        types: vec![CommandType::Slash, CommandType::Prefix],
        dm_permission: true,
        options: vec![OptionConfig {
            strict_autocomplete: true,
            autocomplete_options: Some(AutocompleteSource::Provider(command_name_suggestions)),
            ..OptionConfig::new("command", CommandOptionType::String)
        }],
        run: Some(noop),
        ..CommandConfig::default()
    })
    .init(&i18n())
    .unwrap()
}

/// A slash invocation by `user_id` in guild 100, channel 200, permissions unknown.
pub(crate) fn invocation(user_id: u64) -> Invocation {
    Invocation {
        kind: CommandType::Slash,
        user_id,
        guild_id: Some(100),
        channel_id: 200,
        role_ids: Vec::new(),
        user_permissions: None,
        bot_permissions: None,
        locale: "en-US".to_owned(),
        path: InvocationPath::default(),
        arguments: Vec::new(),
    }
}
