use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ember_core::{BotType, CommandType, DefinitionError, I18nProvider, Settings};
use tracing::{info, warn};

use super::command::Command;

type CommandMap = HashMap<String, Arc<Command>>;

/// Loaded commands keyed by the name they are invoked with. Alias entries
/// are copies with `alias_of` set.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    slash: RwLock<CommandMap>,
    prefix: RwLock<CommandMap>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub enabled: usize,
    pub disabled: usize,
    /// Entries that displaced a different command under the same name.
    pub overwritten: usize,
}

impl CommandRegistry {
    /// Build and init every command, logging the prefix commands as they load.
    pub fn load(
        constructors: &[fn() -> Command],
        i18n: &Arc<dyn I18nProvider>,
        settings: &Settings,
    ) -> Result<Self, DefinitionError> {
        let registry = Self::default();
        let mut summary = LoadSummary::default();

        for constructor in constructors {
            let command = constructor().with_constructor(*constructor).init(i18n)?;
            let loaded = registry.insert(command, settings);
            summary.enabled += loaded.enabled;
            summary.disabled += loaded.disabled;
        }

        info!("Loaded {} Enabled Prefix Commands", summary.enabled);
        if !settings.hide_disabled_command_log {
            info!("Loaded {} Disabled/Non-Beta Prefix Commands", summary.disabled);
        }

        Ok(registry)
    }

    /// Add `command` and its aliases, replacing entries of the same name.
    pub fn insert(&self, command: Command, settings: &Settings) -> LoadSummary {
        let mut summary = LoadSummary::default();

        if command.supports(CommandType::Prefix) {
            let inactive = command.disabled || (settings.bot_type == BotType::Dev && !command.beta);
            log_prefix_load(&command, settings);

            let mut prefix = self.prefix.write().unwrap_or_else(PoisonError::into_inner);
            for alias in &command.aliases.prefix {
                if !command.disabled {
                    info!("Loaded Alias {alias} of Prefix Command {}", command.name);
                } else if !settings.hide_disabled_command_log {
                    info!("Loaded Alias {alias} of Prefix Command {} (disabled)", command.name);
                }
                summary.overwritten +=
                    usize::from(insert_entry(&mut prefix, alias, command.alias_copy(alias), "prefix"));
            }
            summary.overwritten +=
                usize::from(insert_entry(&mut prefix, &command.name, command.clone(), "prefix"));

            let loaded = 1 + command.aliases.prefix.len();
            if inactive {
                summary.disabled += loaded;
            } else {
                summary.enabled += loaded;
            }
        }

        if command.supports(CommandType::Slash) {
            let mut slash = self.slash.write().unwrap_or_else(PoisonError::into_inner);
            for alias in &command.aliases.slash {
                summary.overwritten +=
                    usize::from(insert_entry(&mut slash, alias, command.alias_copy(alias), "slash"));
            }
            let name = command.name.clone();
            summary.overwritten += usize::from(insert_entry(&mut slash, &name, command, "slash"));
        }

        summary
    }

    /// Swap in a reloaded command, dropping every entry of the old one.
    pub fn replace(&self, command: Command, settings: &Settings) {
        let id = command.id.clone();
        for map in [&self.slash, &self.prefix] {
            map.write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|_, entry| entry.id != id);
        }
        self.insert(command, settings);
    }

    pub fn slash_command(&self, name: &str) -> Option<Arc<Command>> {
        let slash = self.slash.read().unwrap_or_else(PoisonError::into_inner);
        slash.get(name).cloned()
    }

    pub fn prefix_command(&self, name: &str) -> Option<Arc<Command>> {
        let prefix = self.prefix.read().unwrap_or_else(PoisonError::into_inner);
        prefix.get(name).cloned()
    }

    /// A non-alias command by name, slash entries first.
    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.slash_command(name)
            .filter(|command| command.alias_of.is_none())
            .or_else(|| self.prefix_command(name).filter(|command| command.alias_of.is_none()))
    }

    /// The command `name` refers to, following slash and prefix aliases.
    pub fn resolve(&self, name: &str) -> Option<Arc<Command>> {
        self.get(name).or_else(|| {
            let alias = self
                .slash_command(name)
                .or_else(|| self.prefix_command(name))?;
            self.get(alias.original_name())
        })
    }

    /// Every loaded command once, without alias copies, ordered by id.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        let mut unique: HashMap<String, Arc<Command>> = HashMap::new();

        for map in [&self.slash, &self.prefix] {
            let map = map.read().unwrap_or_else(PoisonError::into_inner);
            for command in map.values().filter(|command| command.alias_of.is_none()) {
                unique
                    .entry(command.id.clone())
                    .or_insert_with(|| command.clone());
            }
        }

        let mut commands: Vec<_> = unique.into_values().collect();
        commands.sort_by(|left, right| left.id.cmp(&right.id));
        commands
    }

    /// Store the registered application command id of `name` (or an alias).
    pub fn set_command_id(&self, name: &str, command_id: u64) {
        for map in [&self.slash, &self.prefix] {
            let mut map = map.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = map.get_mut(name) {
                Arc::make_mut(entry).command_id = Some(command_id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.commands().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Store `entry` under `name`. True when it displaced another command.
fn insert_entry(map: &mut CommandMap, name: &str, entry: Command, kind: &str) -> bool {
    let id = entry.id.clone();
    match map.insert(name.to_owned(), Arc::new(entry)) {
        Some(previous) if previous.id != id => {
            warn!(
                name,
                kind,
                previous = %previous.id,
                replacement = %id,
                "duplicate command name, previous entry overwritten"
            );
            true
        }
        _ => false,
    }
}

fn log_prefix_load(command: &Command, settings: &Settings) {
    if command.disabled {
        if !settings.hide_disabled_command_log {
            info!("Loaded Disabled Prefix Command {}", command.name);
        }
    } else if command.beta || settings.bot_type != BotType::Dev {
        info!("Loaded Prefix Command {}", command.name);
    } else if !settings.hide_non_beta_command_log {
        info!("Loaded Non-Beta Prefix Command {}", command.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::command::{Aliases, CommandConfig};
    use crate::framework::test_support::{i18n, restrict, roll, roll_config};

    #[test]
    fn registers_names_and_aliases() {
        let registry = CommandRegistry::load(&[roll, restrict], &i18n(), &Settings::default()).unwrap();

        let dice = registry.prefix_command("dice").unwrap();
        assert_eq!(dice.alias_of.as_deref(), Some("roll"));
        assert!(registry.slash_command("dice").is_none());
        assert_eq!(registry.slash_command("r").unwrap().original_name(), "roll");

        // restrict is slash only
        assert!(registry.prefix_command("restrict").is_none());
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.commands().iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            ["commands.config.restrict", "commands.fun.roll"]
        );
        assert!(registry.get("dice").is_none());
        assert!(registry.get("roll").is_some());
        assert_eq!(registry.resolve("dice").unwrap().name, "roll");
        assert_eq!(registry.resolve("r").unwrap().name, "roll");
        assert!(registry.resolve("nope").is_none());
    }

    #[test]
    fn dev_bots_count_non_beta_commands_as_disabled() {
        let registry = CommandRegistry::default();
        let command = roll().init(&i18n()).unwrap();

        let main = registry.insert(command.clone(), &Settings::default());
        assert_eq!(main, LoadSummary { enabled: 2, disabled: 0, overwritten: 0 });

        let dev = Settings {
            bot_type: BotType::Dev,
            ..Settings::default()
        };
        let loaded = registry.insert(command, &dev);
        assert_eq!(loaded, LoadSummary { enabled: 0, disabled: 2, overwritten: 0 });
    }

    #[test]
    fn command_ids_and_replacement() {
        let settings = Settings::default();
        let registry = CommandRegistry::load(&[roll], &i18n(), &settings).unwrap();
        registry.set_command_id("roll", 44);
        assert_eq!(registry.slash_command("roll").unwrap().command_id, Some(44));

        let mut rebuilt = roll().init(&i18n()).unwrap();
        rebuilt.aliases.slash.clear();
        registry.replace(rebuilt, &settings);

        assert!(registry.slash_command("r").is_none());
        assert_eq!(registry.slash_command("roll").unwrap().command_id, None);
    }

    #[test]
    fn duplicate_names_are_counted() {
        let settings = Settings::default();
        let registry = CommandRegistry::default();
        registry.insert(roll().init(&i18n()).unwrap(), &settings);

        let dice = Command::new(CommandConfig {
            name: "dice".to_owned(),
            aliases: Aliases::default(),
            ..roll_config()
        });

        let loaded = registry.insert(dice, &settings);
        assert_eq!(loaded.overwritten, 1);
        assert_eq!(registry.prefix_command("dice").unwrap().alias_of, None);
    }
}
