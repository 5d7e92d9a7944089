use serenity::all::{CommandDataOption, CommandDataOptionValue, CommandOptionType};

use super::choice::ChoiceValue;
use super::option::CommandOption;

/// The subcommand group and subcommand an invocation selected, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvocationPath {
    pub group: Option<String>,
    pub subcommand: Option<String>,
}

impl InvocationPath {
    pub fn is_root(&self) -> bool {
        self.group.is_none() && self.subcommand.is_none()
    }

    /// `name`, `name group`, `name group sub` as typed by users.
    pub fn display(&self, command_name: &str) -> String {
        [Some(command_name), self.group.as_deref(), self.subcommand.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArgumentValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(u64),
    Channel(u64),
    Role(u64),
    Mentionable(u64),
    Attachment(u64),
}

impl ArgumentValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            Self::User(id)
            | Self::Channel(id)
            | Self::Role(id)
            | Self::Mentionable(id)
            | Self::Attachment(id) => Some(*id),
            _ => None,
        }
    }

    /// The value as a choice value, for values a choice or suggestion can hold.
    pub fn as_choice(&self) -> Option<ChoiceValue> {
        match self {
            Self::String(text) => Some(ChoiceValue::String(text.clone())),
            Self::Integer(value) => Some(ChoiceValue::Integer(*value)),
            Self::Number(value) => Some(ChoiceValue::Number(*value)),
            _ => None,
        }
    }
}

pub type Arguments = Vec<(String, ArgumentValue)>;

/// Split interaction options into the invoked path and the leaf arguments.
pub fn parse_interaction_options(options: &[CommandDataOption]) -> (InvocationPath, Arguments) {
    let mut path = InvocationPath::default();
    let mut arguments = Vec::new();
    collect_interaction_options(options, &mut path, &mut arguments);
    (path, arguments)
}

fn collect_interaction_options(
    options: &[CommandDataOption],
    path: &mut InvocationPath,
    arguments: &mut Arguments,
) {
    for option in options {
        let value = match &option.value {
            CommandDataOptionValue::SubCommandGroup(inner) => {
                path.group = Some(option.name.clone());
                collect_interaction_options(inner, path, arguments);
                continue;
            }
            CommandDataOptionValue::SubCommand(inner) => {
                path.subcommand = Some(option.name.clone());
                collect_interaction_options(inner, path, arguments);
                continue;
            }
            CommandDataOptionValue::String(text) => ArgumentValue::String(text.clone()),
            CommandDataOptionValue::Autocomplete { value, .. } => {
                ArgumentValue::String(value.clone())
            }
            CommandDataOptionValue::Integer(value) => ArgumentValue::Integer(*value),
            CommandDataOptionValue::Number(value) => ArgumentValue::Number(*value),
            CommandDataOptionValue::Boolean(value) => ArgumentValue::Boolean(*value),
            CommandDataOptionValue::User(id) => ArgumentValue::User(id.get()),
            CommandDataOptionValue::Channel(id) => ArgumentValue::Channel(id.get()),
            CommandDataOptionValue::Role(id) => ArgumentValue::Role(id.get()),
            CommandDataOptionValue::Mentionable(id) => ArgumentValue::Mentionable(id.get()),
            CommandDataOptionValue::Attachment(id) => ArgumentValue::Attachment(id.get()),
            _ => continue,
        };
        arguments.push((option.name.clone(), value));
    }
}

fn is_subcommand_kind(kind: CommandOptionType) -> bool {
    matches!(
        kind,
        CommandOptionType::SubCommand | CommandOptionType::SubCommandGroup
    )
}

/// Map whitespace-split prefix arguments onto the declared options.
///
/// Leading words naming a subcommand group or subcommand select them. The
/// remaining words fill leaf options in declaration order; a trailing string
/// option takes the rest of the line. Words that do not parse as their
/// option's type are skipped for that option.
pub fn map_prefix_arguments(options: &[CommandOption], args: &[String]) -> (InvocationPath, Arguments) {
    let mut path = InvocationPath::default();
    let mut scope = options;
    let mut rest = args;

    while let Some((first, tail)) = rest.split_first() {
        let Some(selected) = scope.iter().find(|option| {
            is_subcommand_kind(option.kind) && option.name.eq_ignore_ascii_case(first)
        }) else {
            break;
        };

        if selected.kind == CommandOptionType::SubCommandGroup {
            path.group = Some(selected.name.clone());
        } else {
            path.subcommand = Some(selected.name.clone());
        }
        scope = &selected.options;
        rest = tail;
    }

    let leaves: Vec<&CommandOption> = scope
        .iter()
        .filter(|option| !is_subcommand_kind(option.kind))
        .collect();

    let mut arguments = Vec::new();
    let mut words = rest.iter();

    for (index, option) in leaves.iter().enumerate() {
        let is_last = index + 1 == leaves.len();
        let raw = if is_last && option.kind == CommandOptionType::String {
            let joined = words.by_ref().map(String::as_str).collect::<Vec<_>>().join(" ");
            (!joined.is_empty()).then_some(joined)
        } else {
            words.next().cloned()
        };

        let Some(raw) = raw else {
            break;
        };

        if let Some(value) = parse_prefix_value(option.kind, &raw) {
            arguments.push((option.name.clone(), value));
        }
    }

    (path, arguments)
}

fn parse_prefix_value(kind: CommandOptionType, raw: &str) -> Option<ArgumentValue> {
    match kind {
        CommandOptionType::String => Some(ArgumentValue::String(raw.to_owned())),
        CommandOptionType::Integer => raw.parse().ok().map(ArgumentValue::Integer),
        CommandOptionType::Number => raw.parse().ok().map(ArgumentValue::Number),
        CommandOptionType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(ArgumentValue::Boolean(true)),
            "false" | "no" | "off" | "0" => Some(ArgumentValue::Boolean(false)),
            _ => None,
        },
        CommandOptionType::User => parse_mention(raw, &["<@!", "<@"]).map(ArgumentValue::User),
        CommandOptionType::Channel => parse_mention(raw, &["<#"]).map(ArgumentValue::Channel),
        CommandOptionType::Role => parse_mention(raw, &["<@&"]).map(ArgumentValue::Role),
        CommandOptionType::Mentionable => {
            parse_mention(raw, &["<@&", "<@!", "<@"]).map(ArgumentValue::Mentionable)
        }
        _ => None,
    }
}

/// `<@123>`-style mention or a raw id.
fn parse_mention(raw: &str, prefixes: &[&str]) -> Option<u64> {
    let inner = prefixes
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix)?.strip_suffix('>'))
        .unwrap_or(raw);

    inner.parse().ok().filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::option::OptionConfig;

    fn option(name: &str, kind: CommandOptionType) -> CommandOption {
        CommandOption::new(OptionConfig::new(name, kind))
    }

    fn words(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn trailing_string_takes_the_rest() {
        let options = [
            option("target", CommandOptionType::User),
            option("reason", CommandOptionType::String),
        ];

        let (path, args) = map_prefix_arguments(&options, &words("<@!42> too much spam"));
        assert!(path.is_root());
        assert_eq!(
            args,
            vec![
                ("target".to_owned(), ArgumentValue::User(42)),
                ("reason".to_owned(), ArgumentValue::String("too much spam".to_owned())),
            ]
        );
    }

    #[test]
    fn subcommands_are_selected_by_leading_words() {
        let mut add = option("add", CommandOptionType::SubCommand);
        add.options = vec![
            option("command", CommandOptionType::String),
            option("role", CommandOptionType::Role),
        ];
        let mut group = option("rules", CommandOptionType::SubCommandGroup);
        group.options = vec![add];

        let (path, args) = map_prefix_arguments(&[group], &words("rules ADD ping 77"));
        assert_eq!(path.group.as_deref(), Some("rules"));
        assert_eq!(path.subcommand.as_deref(), Some("add"));
        assert_eq!(path.display("restrict"), "restrict rules add");
        assert_eq!(
            args,
            vec![
                ("command".to_owned(), ArgumentValue::String("ping".to_owned())),
                ("role".to_owned(), ArgumentValue::Role(77)),
            ]
        );
    }

    #[test]
    fn unparsable_words_are_skipped() {
        let options = [
            option("amount", CommandOptionType::Integer),
            option("silent", CommandOptionType::Boolean),
        ];

        let (_, args) = map_prefix_arguments(&options, &words("many yes"));
        assert_eq!(args, vec![("silent".to_owned(), ArgumentValue::Boolean(true))]);
    }

    #[test]
    fn mentions_and_raw_ids_parse() {
        assert_eq!(parse_mention("<#10>", &["<#"]), Some(10));
        assert_eq!(parse_mention("10", &["<#"]), Some(10));
        assert_eq!(parse_mention("<@&5>", &["<@&", "<@"]), Some(5));
        assert_eq!(parse_mention("<#x>", &["<#"]), None);
    }
}
