use std::sync::Arc;
use std::time::Duration;

use ember_core::{
    CooldownScopes, CooldownTracker, Cooldowns, Data, I18nProvider, Settings, Translator,
};
use ember_database::model::restrictions::{CommandRestriction, RestrictionScope};
use ember_utils::formatting::format_compact_duration;
use ember_utils::permissions::missing_permissions;
use serenity::all::Permissions;

use super::autocomplete::AutocompleteQuery;
use super::choice::ChoiceValue;
use super::command::Command;
use super::context::Invocation;
use super::registry::CommandRegistry;

/// Whose permissions are missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionTarget {
    User,
    Bot,
}

/// Why a command may not run right now.
#[derive(Clone, Debug, PartialEq)]
pub enum Denial {
    Disabled {
        reason: Option<String>,
    },
    /// Not answered at all.
    DevOnly,
    GuildOnly,
    Restricted {
        scope: RestrictionScope,
    },
    StrictAutocompleteNoMatch {
        option: String,
        values: Vec<String>,
    },
    MissingPermissions {
        missing: Permissions,
        target: PermissionTarget,
        /// False when the bot cannot talk in the channel; the notice goes
        /// to the user's DMs instead.
        reply_in_channel: bool,
    },
    OnCooldown {
        remaining: Duration,
    },
}

impl Denial {
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::DevOnly)
    }

    /// Notice text for keyed denials. `lang` is expected to have the
    /// `events.command` backup path.
    pub fn message(&self, lang: &Translator) -> Option<String> {
        let text = match self {
            Self::Disabled { reason } => {
                let reason = reason.clone().unwrap_or_else(|| lang.t("global.none"));
                lang.t_with("disabled", &[("reason", &reason)])
            }
            Self::DevOnly | Self::MissingPermissions { .. } => return None,
            Self::GuildOnly => lang.t("guildOnly"),
            Self::Restricted { scope } => lang.t(&format!("notAllowed.{}", scope.as_str())),
            Self::StrictAutocompleteNoMatch { option, values } if values.is_empty() => {
                lang.t_with("strictAutocompleteNoMatch", &[("option", option)])
            }
            Self::StrictAutocompleteNoMatch { option, values } => lang.t_with(
                "strictAutocompleteNoMatchWValues",
                &[("option", option), ("availableOptions", &values.join(", "))],
            ),
            Self::OnCooldown { remaining } => {
                let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                lang.t_with("cooldown", &[("time", &format_compact_duration(seconds))])
            }
        };

        Some(text)
    }
}

/// State the checks read besides the invocation itself.
pub struct CheckEnv<'a> {
    pub settings: &'a Settings,
    pub cooldowns: &'a CooldownTracker,
    /// Guild restriction entries for this command, if any were loaded.
    pub restriction: Option<&'a CommandRestriction>,
    pub i18n: &'a Arc<dyn I18nProvider>,
    pub registry: &'a CommandRegistry,
    pub data: Option<&'a Data>,
}

fn permission_denial(command: &Command, invocation: &Invocation) -> Option<Denial> {
    invocation.guild_id?;

    let bot_required =
        command.permissions.client | Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
    let bot_missing = invocation
        .bot_permissions
        .map(|granted| missing_permissions(granted, bot_required))
        .unwrap_or_else(Permissions::empty);

    if !bot_missing.is_empty() {
        let cannot_speak = bot_missing
            .intersects(Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES);
        return Some(Denial::MissingPermissions {
            missing: bot_missing,
            target: PermissionTarget::Bot,
            reply_in_channel: !cannot_speak,
        });
    }

    let user_required = command.permissions.user | Permissions::SEND_MESSAGES;
    let user_missing = invocation
        .user_permissions
        .map(|granted| missing_permissions(granted, user_required))
        .unwrap_or_else(Permissions::empty);

    (!user_missing.is_empty()).then_some(Denial::MissingPermissions {
        missing: user_missing,
        target: PermissionTarget::User,
        reply_in_channel: true,
    })
}

fn autocomplete_query<'a>(
    query: &'a str,
    invocation: &'a Invocation,
    env: &CheckEnv<'a>,
) -> AutocompleteQuery<'a> {
    AutocompleteQuery {
        query,
        locale: &invocation.locale,
        user_id: invocation.user_id,
        guild_id: invocation.guild_id,
        registry: env.registry,
        data: env.data,
    }
}

impl Command {
    /// Cooldown keys of this invocation: the command, then every invoked
    /// subcommand level that declares its own cooldown.
    fn cooldown_entries(&self, invocation: &Invocation) -> Vec<(String, Cooldowns)> {
        let mut key = self.original_name().to_owned();
        let mut entries = vec![(key.clone(), self.cooldowns)];

        for option in self.invoked_options(&invocation.path) {
            key = format!("{key}.{}", option.name);
            if !option.cooldowns.is_none() {
                entries.push((key.clone(), option.cooldowns));
            }
        }

        entries
    }

    async fn strict_autocomplete_denial(
        &self,
        invocation: &Invocation,
        env: &CheckEnv<'_>,
    ) -> Option<Denial> {
        for option in self.options_at(&invocation.path) {
            if !option.strict_autocomplete || option.autocomplete_options.is_none() {
                continue;
            }

            let Some(provided) = invocation
                .argument(&option.name)
                .and_then(|value| value.as_choice())
            else {
                continue;
            };

            let text = provided.to_string();

            // a failing provider cannot vouch for the value
            let matching = option
                .generate_autocomplete(autocomplete_query(&text, invocation, env), env.i18n)
                .await
                .unwrap_or_default();
            if matching.iter().any(|suggestion| suggestion.value == provided) {
                continue;
            }

            let values = option
                .generate_autocomplete(autocomplete_query("", invocation, env), env.i18n)
                .await
                .unwrap_or_default()
                .into_iter()
                .map(|suggestion| match suggestion.value {
                    ChoiceValue::String(value) => value,
                    other => other.to_string(),
                })
                .collect();

            return Some(Denial::StrictAutocompleteNoMatch {
                option: option.name.clone(),
                values,
            });
        }

        None
    }

    /// First reason this invocation may not run, checked in a fixed order.
    pub async fn is_runnable(&self, invocation: &Invocation, env: &CheckEnv<'_>) -> Result<(), Denial> {
        if self.disabled {
            return Err(Denial::Disabled {
                reason: self.disabled_reason.clone(),
            });
        }

        if env.settings.is_dev_only(&self.category) && !env.settings.is_owner(invocation.user_id) {
            return Err(Denial::DevOnly);
        }

        if invocation.guild_id.is_none() && !self.dm_permission {
            return Err(Denial::GuildOnly);
        }

        if invocation.guild_id.is_some()
            && let Some(scope) = env.restriction.and_then(|restriction| {
                restriction.blocking_scope(
                    invocation.user_id,
                    invocation.channel_id,
                    &invocation.role_ids,
                )
            })
        {
            return Err(Denial::Restricted { scope });
        }

        if let Some(denial) = self.strict_autocomplete_denial(invocation, env).await {
            return Err(denial);
        }

        if let Some(denial) = permission_denial(self, invocation) {
            return Err(denial);
        }

        let entries = self.cooldown_entries(invocation);
        let entries: Vec<(&str, Cooldowns)> = entries
            .iter()
            .map(|(key, cooldowns)| (key.as_str(), *cooldowns))
            .collect();
        let scopes = CooldownScopes {
            guild_id: invocation.guild_id,
            channel_id: Some(invocation.channel_id),
            user_id: invocation.user_id,
        };

        let remaining = env.cooldowns.hit_all(&entries, scopes);
        if !remaining.is_zero() {
            return Err(Denial::OnCooldown { remaining });
        }

        Ok(())
    }
}
