use std::collections::BTreeMap;

use ember_core::i18n::discord_locale;
use ember_core::{CommandType, Settings, Translator};
use ember_utils::formatting::capitalize;

use super::autocomplete::{AutocompleteFuture, AutocompleteItem, AutocompleteQuery};
use super::command::Command;
use super::registry::CommandRegistry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandListing {
    pub name: String,
    pub usage: String,
    pub description: String,
    pub alias: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryListing {
    /// Translated category name.
    pub category: String,
    pub aliases_disabled: bool,
    pub list: Vec<CommandListing>,
}

/// Remove every case-insensitive occurrence of `needle`.
fn strip_ignore_case(text: &str, needle: &str) -> String {
    let lower = text.to_lowercase();
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return text.to_owned();
    }
    // lowercasing changed byte offsets, only exact-case matches can be cut
    if lower.len() != text.len() {
        return text.replace(&needle, "");
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = 0;
    for (start, _) in lower.match_indices(&needle) {
        out.push_str(&text[rest..start]);
        rest = start + needle.len();
    }
    out.push_str(&text[rest..]);
    out
}

fn localized_description(command: &Command, locale: &str) -> String {
    discord_locale(locale)
        .and_then(|discord| command.description_localizations.get(discord))
        .unwrap_or(&command.description)
        .clone()
}

fn alias_text(command: &Command, none: &str) -> String {
    let mut text = String::new();
    if !command.aliases.prefix.is_empty() {
        text.push_str(&format!("Prefix: {}\n", command.aliases.prefix.join(", ")));
    }
    if !command.aliases.slash.is_empty() {
        text.push_str(&format!("Slash: {}", command.aliases.slash.join(", ")));
    }

    let text = text.trim();
    if text.is_empty() { none.to_owned() } else { text.to_owned() }
}

/// Help entry of one command in `lang`'s locale.
pub fn command_listing(command: &Command, lang: &Translator, prefix: &str) -> CommandListing {
    let usage = command
        .usage_for(lang.locale())
        .with_prefix(prefix)
        .usage
        .map(|usage| strip_ignore_case(&usage, "slash command:"));

    let mut text = String::new();
    if command.supports(CommandType::Slash) {
        text.push_str(&lang.t("others.getCommands.lookAtOptionDesc"));
    }
    text.push_str(usage.as_deref().unwrap_or_default());

    let usage = match text.trim() {
        "" => lang.t("others.getCommands.noInfo"),
        trimmed => trimmed.to_owned(),
    };

    CommandListing {
        name: command.name.clone(),
        usage,
        description: localized_description(command, lang.locale()),
        alias: alias_text(command, &lang.t("global.none")),
    }
}

/// Public commands grouped by category: biggest categories first, `others`
/// last.
pub fn command_list(
    registry: &CommandRegistry,
    lang: &Translator,
    settings: &Settings,
) -> Vec<CategoryListing> {
    let none = lang.t("global.none");
    let mut grouped: BTreeMap<String, Vec<CommandListing>> = BTreeMap::new();

    for command in registry.commands() {
        if command.disabled || settings.is_dev_only(&command.category) {
            continue;
        }

        grouped
            .entry(command.category.clone())
            .or_default()
            .push(command_listing(&command, lang, &settings.prefix));
    }

    let mut categories: Vec<(String, Vec<CommandListing>)> = grouped.into_iter().collect();
    categories.sort_by(|(left_name, left), (right_name, right)| {
        (left_name == "others")
            .cmp(&(right_name == "others"))
            .then_with(|| right.len().cmp(&left.len()))
            .then_with(|| left_name.cmp(right_name))
    });

    categories
        .into_iter()
        .map(|(category, list)| CategoryListing {
            category: lang
                .get(&format!("commands.{category}.categoryName"))
                .unwrap_or_else(|| capitalize(&category)),
            aliases_disabled: !list.iter().any(|entry| entry.alias != none),
            list,
        })
        .collect()
}

/// Autocomplete provider listing the names of commands the caller could run.
pub fn command_name_suggestions<'a>(query: AutocompleteQuery<'a>) -> AutocompleteFuture<'a> {
    Box::pin(async move {
        let settings = query.data.map(|data| data.settings.as_ref());

        Ok(query
            .registry
            .commands()
            .iter()
            .filter(|command| !command.disabled)
            .filter(|command| match settings {
                Some(settings) => {
                    !settings.is_dev_only(&command.category) || settings.is_owner(query.user_id)
                }
                None => true,
            })
            .map(|command| AutocompleteItem::pair(command.name.clone(), command.name.clone()))
            .collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::test_support::{i18n, restrict, roll, secret};

    #[test]
    fn strips_case_insensitively() {
        assert_eq!(strip_ignore_case("Slash Command: /roll", "slash command:"), " /roll");
        assert_eq!(strip_ignore_case("no match", "slash command:"), "no match");
    }

    #[test]
    fn lists_public_commands_by_category() {
        let settings = Settings::default();
        let registry = CommandRegistry::load(&[roll, restrict, secret], &i18n(), &settings).unwrap();
        let lang = Translator::new(i18n(), "de");

        let listing = command_list(&registry, &lang, &settings);
        let categories: Vec<_> = listing.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, ["Konfiguration", "Spaß"]);

        let roll = &listing[1].list[0];
        assert_eq!(roll.name, "roll");
        assert_eq!(roll.description, "Würfeln");
        assert_eq!(roll.usage, "Siehe Optionsbeschreibungen. !roll <seiten>");
        assert_eq!(roll.alias, "Prefix: dice\nSlash: r");
        assert!(!listing[1].aliases_disabled);

        let restrict = &listing[0];
        assert!(restrict.aliases_disabled);
        assert_eq!(restrict.list[0].alias, "Keine");
    }
}
