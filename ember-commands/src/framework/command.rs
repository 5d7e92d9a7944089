use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ember_core::{CommandType, Cooldowns, DefinitionError, I18nProvider, Translator};
use serenity::all::{CommandOptionType, Permissions};

use super::arguments::InvocationPath;
use super::autocomplete::{AutocompleteQuery, Suggestion};
use super::context::RunFn;
use super::localize::{LocalizeTarget, localize_description};
use super::option::{CommandOption, OptionConfig};
use super::payload::{CHAT_INPUT_COMMAND_TYPE, CommandPayload};
use super::validate::{fix_name_case, validate_name};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub usage: Option<String>,
    pub examples: Option<String>,
}

impl Usage {
    /// Substitute the `{prefix}` placeholder.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            usage: self.usage.as_ref().map(|text| text.replace("{prefix}", prefix)),
            examples: self.examples.as_ref().map(|text| text.replace("{prefix}", prefix)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aliases {
    pub slash: Vec<String>,
    pub prefix: Vec<String>,
}

impl Aliases {
    pub fn get(&self, kind: CommandType) -> &[String] {
        match kind {
            CommandType::Slash => &self.slash,
            CommandType::Prefix => &self.prefix,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slash.is_empty() && self.prefix.is_empty()
    }
}

/// `client` is what the bot needs, `user` what the member needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandPermissions {
    pub client: Permissions,
    pub user: Permissions,
}

impl Default for CommandPermissions {
    fn default() -> Self {
        Self {
            client: Permissions::empty(),
            user: Permissions::empty(),
        }
    }
}

/// Declarative form of a command, as returned by command constructors.
#[derive(Clone, Default)]
pub struct CommandConfig {
    pub name: String,
    pub category: String,
    pub types: Vec<CommandType>,
    pub usage: Usage,
    pub aliases: Aliases,
    pub cooldowns: Cooldowns,
    pub permissions: CommandPermissions,
    pub dm_permission: bool,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
    pub no_defer: bool,
    pub ephemeral_defer: bool,
    pub beta: bool,
    pub options: Vec<OptionConfig>,
    pub run: Option<RunFn>,
}

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub name_localizations: HashMap<String, String>,
    /// Id of the registered application command, once known.
    pub command_id: Option<u64>,
    pub description: String,
    pub description_localizations: HashMap<String, String>,
    /// Translation root, `commands.{category}.{name}`.
    pub id: String,
    pub category: String,
    pub types: Vec<CommandType>,
    pub usage: Usage,
    /// Keyed by i18n locale.
    pub usage_localizations: HashMap<String, Usage>,
    pub aliases: Aliases,
    pub cooldowns: Cooldowns,
    pub permissions: CommandPermissions,
    pub dm_permission: bool,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
    pub no_defer: bool,
    pub ephemeral_defer: bool,
    pub beta: bool,
    pub options: Vec<CommandOption>,
    /// Set on alias copies: name of the command they stand in for.
    pub alias_of: Option<String>,
    configured_usage: Usage,
    run: Option<RunFn>,
    constructor: Option<fn() -> Command>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("command_id", &self.command_id)
            .field("types", &self.types)
            .field("aliases", &self.aliases)
            .field("disabled", &self.disabled)
            .field("alias_of", &self.alias_of)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Command {
    pub fn new(config: CommandConfig) -> Self {
        Self {
            name: config.name,
            name_localizations: HashMap::new(),
            command_id: None,
            description: String::new(),
            description_localizations: HashMap::new(),
            id: String::new(),
            category: config.category,
            types: config.types,
            usage: Usage::default(),
            usage_localizations: HashMap::new(),
            aliases: config.aliases,
            cooldowns: config.cooldowns,
            permissions: config.permissions,
            dm_permission: config.dm_permission,
            disabled: config.disabled,
            disabled_reason: config.disabled_reason,
            no_defer: config.no_defer,
            ephemeral_defer: config.ephemeral_defer,
            beta: config.beta,
            options: config.options.into_iter().map(CommandOption::new).collect(),
            alias_of: None,
            configured_usage: config.usage,
            run: config.run,
            constructor: None,
        }
    }

    /// Remember how to rebuild this command for [`Command::reload`].
    pub fn with_constructor(mut self, constructor: fn() -> Command) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn constructor(&self) -> Option<fn() -> Command> {
        self.constructor
    }

    pub fn supports(&self, kind: CommandType) -> bool {
        self.types.contains(&kind)
    }

    pub fn is_slash(&self) -> bool {
        self.supports(CommandType::Slash)
    }

    /// Name of the command this entry runs as, resolving aliases.
    pub fn original_name(&self) -> &str {
        self.alias_of.as_deref().unwrap_or(&self.name)
    }

    pub fn default_member_permissions(&self) -> Option<Permissions> {
        (!self.permissions.user.is_empty()).then_some(self.permissions.user)
    }

    /// Localized usage, falling back to the default locale.
    pub fn usage_for(&self, locale: &str) -> &Usage {
        self.usage_localizations.get(locale).unwrap_or(&self.usage)
    }

    pub fn init(mut self, i18n: &Arc<dyn I18nProvider>) -> Result<Self, DefinitionError> {
        self.category = self.category.to_lowercase();
        let pre_fix_id = format!("commands.{}.{}", self.category, self.name);
        fix_name_case(&mut self.name, "Command", &pre_fix_id, self.disabled);
        self.id = format!("commands.{}.{}", self.category, self.name);

        self.validate()?;
        self.localize(i18n)?;

        let id = self.id.clone();
        self.options = std::mem::take(&mut self.options)
            .into_iter()
            .map(|option| option.init(i18n, &id))
            .collect::<Result<_, _>>()?;

        Ok(self)
    }

    fn validate(&mut self) -> Result<(), DefinitionError> {
        validate_name(&self.name, &self.id)?;

        if self.types.is_empty() {
            return Err(DefinitionError::NoCommandTypes {
                id: self.id.clone(),
            });
        }

        if !self.disabled && self.run.is_none() && !self.options_have_handlers() {
            return Err(DefinitionError::MissingRunHandler {
                id: self.id.clone(),
            });
        }

        for alias in self
            .aliases
            .slash
            .iter_mut()
            .chain(self.aliases.prefix.iter_mut())
        {
            *alias = alias.to_lowercase();
        }
        for list in [&mut self.aliases.slash, &mut self.aliases.prefix] {
            let mut seen = Vec::with_capacity(list.len());
            list.retain(|alias| {
                let fresh = !seen.contains(alias);
                if fresh {
                    seen.push(alias.clone());
                }
                fresh
            });
        }
        for alias in &self.aliases.slash {
            validate_name(alias, &self.id)?;
        }

        Ok(())
    }

    /// Every subcommand has its own handler.
    fn options_have_handlers(&self) -> bool {
        fn covered(options: &[CommandOption]) -> bool {
            let mut subcommands = options.iter().filter(|option| {
                matches!(
                    option.kind,
                    CommandOptionType::SubCommand | CommandOptionType::SubCommandGroup
                )
            });

            let mut any = false;
            let all = subcommands.all(|option| {
                any = true;
                match option.kind {
                    CommandOptionType::SubCommandGroup => covered(&option.options),
                    _ => option.run.is_some(),
                }
            });
            any && all
        }

        covered(&self.options)
    }

    fn localize(&mut self, i18n: &Arc<dyn I18nProvider>) -> Result<(), DefinitionError> {
        for locale in i18n.available_locales() {
            let lang = Translator::new(i18n.clone(), locale.clone())
                .with_backup_path(self.id.clone())
                .without_default_fallback();

            let target = LocalizeTarget {
                kind: "command",
                name: &self.name,
                id: &self.id,
                disabled: self.disabled,
            };
            localize_description(
                &lang,
                &target,
                &mut self.description,
                &mut self.description_localizations,
            )?;

            let render = |text: String| {
                format!("{{prefix}}{{cmdName}} {text}")
                    .replace("{cmdName}", &self.name)
                    .trim_end()
                    .to_owned()
            };
            let usage = Usage {
                usage: self
                    .configured_usage
                    .usage
                    .clone()
                    .or_else(|| lang.get("usage.usage"))
                    .map(render),
                examples: self
                    .configured_usage
                    .examples
                    .clone()
                    .or_else(|| lang.get("usage.examples"))
                    .map(render),
            };

            if lang.is_default_locale() {
                self.usage = usage;
            } else {
                self.usage_localizations.insert(locale, usage);
            }
        }

        Ok(())
    }

    pub fn to_payload(&self) -> CommandPayload {
        self.to_payload_named(&self.name)
    }

    /// Payload registered under `name`, used for slash aliases.
    pub fn to_payload_named(&self, name: &str) -> CommandPayload {
        CommandPayload {
            name: name.to_owned(),
            name_localizations: self.name_localizations.clone(),
            description: self.description.clone(),
            description_localizations: self.description_localizations.clone(),
            kind: CHAT_INPUT_COMMAND_TYPE,
            options: self.options.iter().map(CommandOption::to_payload).collect(),
            default_member_permissions: self.default_member_permissions().map(|perms| perms.bits()),
            dm_permission: Some(self.dm_permission),
        }
    }

    pub fn is_equal_to(&self, other: &Command) -> bool {
        self.to_payload().same_as(&other.to_payload())
    }

    /// Copy standing in for this command under `alias`.
    pub fn alias_copy(&self, alias: &str) -> Command {
        let mut copy = self.clone();
        copy.name = alias.to_owned();
        copy.alias_of = Some(self.name.clone());
        copy
    }

    /// Options visible at `path`: the root options, or those of the selected
    /// group and subcommand. Empty when the path does not exist.
    pub fn options_at(&self, path: &InvocationPath) -> &[CommandOption] {
        let mut scope = self.options.as_slice();

        for name in [path.group.as_deref(), path.subcommand.as_deref()]
            .into_iter()
            .flatten()
        {
            match scope.iter().find(|option| option.name == name) {
                Some(option) => scope = &option.options,
                None => return &[],
            }
        }

        scope
    }

    /// The group and subcommand options `path` selects, outermost first.
    pub fn invoked_options(&self, path: &InvocationPath) -> Vec<&CommandOption> {
        let mut chain = Vec::new();
        let mut scope = self.options.as_slice();

        for name in [path.group.as_deref(), path.subcommand.as_deref()]
            .into_iter()
            .flatten()
        {
            let Some(option) = scope.iter().find(|option| option.name == name) else {
                break;
            };
            chain.push(option);
            scope = &option.options;
        }

        chain
    }

    /// Find an option by name (and kind, if given). With a non-root `path`
    /// only the options of the invoked subcommand are searched, otherwise
    /// the whole tree depth-first.
    pub fn find_option(
        &self,
        name: &str,
        kind: Option<CommandOptionType>,
        path: &InvocationPath,
    ) -> Option<&CommandOption> {
        let matches =
            |option: &&CommandOption| option.name == name && kind.is_none_or(|kind| option.kind == kind);

        if !path.is_root() {
            return self.options_at(path).iter().find(matches);
        }

        fn walk<'o>(
            options: &'o [CommandOption],
            matches: &dyn Fn(&&CommandOption) -> bool,
        ) -> Option<&'o CommandOption> {
            options.iter().find_map(|option| {
                if matches(&option) {
                    Some(option)
                } else {
                    walk(&option.options, matches)
                }
            })
        }

        walk(&self.options, &matches)
    }

    /// Deepest invoked subcommand handler, else the command's own.
    pub fn run_handler(&self, path: &InvocationPath) -> Option<RunFn> {
        self.invoked_options(path)
            .iter()
            .rev()
            .find_map(|option| option.run)
            .or(self.run)
    }

    /// Suggestions for the focused option `focused` at `path`.
    pub async fn autocomplete_for(
        &self,
        path: &InvocationPath,
        focused: &str,
        query: AutocompleteQuery<'_>,
        i18n: &Arc<dyn I18nProvider>,
    ) -> anyhow::Result<Vec<Suggestion>> {
        match self.options_at(path).iter().find(|option| option.name == focused) {
            Some(option) => option.generate_autocomplete(query, i18n).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::test_support::{i18n, restrict_config, roll_config};

    #[test]
    fn init_builds_id_usage_and_localizations() {
        let command = Command::new(roll_config()).init(&i18n()).unwrap();

        assert_eq!(command.id, "commands.fun.roll");
        assert_eq!(command.description, "Roll a die");
        assert_eq!(
            command.description_localizations.get("de").map(String::as_str),
            Some("Würfeln")
        );
        assert_eq!(command.usage.usage.as_deref(), Some("{prefix}roll <sides>"));
        assert_eq!(
            command.usage_for("de").usage.as_deref(),
            Some("{prefix}roll <seiten>")
        );
        assert_eq!(
            command.usage.with_prefix("!").usage.as_deref(),
            Some("!roll <sides>")
        );
        assert_eq!(command.aliases.prefix, ["dice"]);
    }

    #[test]
    fn configured_usage_wins_over_translations() {
        let config = CommandConfig {
            usage: Usage {
                usage: Some("[sides]".to_owned()),
                examples: None,
            },
            ..roll_config()
        };
        let command = Command::new(config).init(&i18n()).unwrap();
        assert_eq!(command.usage.usage.as_deref(), Some("{prefix}roll [sides]"));
        assert_eq!(
            command.usage_for("de").usage.as_deref(),
            Some("{prefix}roll [sides]")
        );
    }

    #[test]
    fn validation_errors() {
        let config = CommandConfig {
            run: None,
            ..roll_config()
        };
        assert!(matches!(
            Command::new(config).init(&i18n()),
            Err(DefinitionError::MissingRunHandler { .. })
        ));

        let config = CommandConfig {
            run: None,
            disabled: true,
            ..roll_config()
        };
        assert!(Command::new(config).init(&i18n()).is_ok());

        let config = CommandConfig {
            types: Vec::new(),
            ..roll_config()
        };
        assert!(matches!(
            Command::new(config).init(&i18n()),
            Err(DefinitionError::NoCommandTypes { .. })
        ));
    }

    #[test]
    fn subcommand_handlers_satisfy_the_run_check() {
        let command = Command::new(restrict_config()).init(&i18n()).unwrap();
        assert!(command.run.is_none());

        let path = InvocationPath {
            group: None,
            subcommand: Some("add".to_owned()),
        };
        assert!(command.run_handler(&path).is_some());
        assert!(command.run_handler(&InvocationPath::default()).is_none());
    }

    #[test]
    fn member_permissions_empty_means_none() {
        let command = Command::new(roll_config()).init(&i18n()).unwrap();
        assert_eq!(command.default_member_permissions(), None);
        assert_eq!(command.to_payload().default_member_permissions, None);

        let command = Command::new(restrict_config()).init(&i18n()).unwrap();
        assert_eq!(
            command.default_member_permissions(),
            Some(Permissions::MANAGE_GUILD)
        );
    }

    #[test]
    fn find_option_honours_the_path() {
        let command = Command::new(restrict_config()).init(&i18n()).unwrap();
        let add = InvocationPath {
            group: None,
            subcommand: Some("add".to_owned()),
        };

        let found = command
            .find_option("user", Some(CommandOptionType::User), &add)
            .unwrap();
        assert_eq!(found.id, "commands.config.restrict.options.add.options.user");

        assert!(command.find_option("user", None, &InvocationPath::default()).is_some());
        assert!(command
            .find_option("user", Some(CommandOptionType::Role), &add)
            .is_none());
        assert!(command.options_at(&InvocationPath {
            group: None,
            subcommand: Some("nope".to_owned()),
        })
        .is_empty());
    }

    #[test]
    fn equality_tracks_payload_changes() {
        let command = Command::new(roll_config()).init(&i18n()).unwrap();
        let mut other = command.clone();
        assert!(command.is_equal_to(&other));

        other.dm_permission = !other.dm_permission;
        assert!(!command.is_equal_to(&other));

        let mut other = command.clone();
        other.permissions.user = Permissions::ADMINISTRATOR;
        assert!(!command.is_equal_to(&other));

        let alias = command.alias_copy("dice");
        assert_eq!(alias.alias_of.as_deref(), Some("roll"));
        assert_eq!(alias.original_name(), "roll");
        assert!(!command.is_equal_to(&alias));
    }
}
