use std::env;

/// `Dev` bots only count beta commands as enabled and skip usage counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BotType {
    #[default]
    Main,
    Dev,
}

impl BotType {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("dev") {
            Self::Dev
        } else {
            Self::Main
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub bot_type: BotType,
    pub prefix: String,
    pub owner_ids: Vec<u64>,
    pub dev_only_categories: Vec<String>,
    /// Register application commands in this guild instead of globally.
    pub dev_guild_id: Option<u64>,
    pub hide_disabled_command_log: bool,
    pub hide_non_beta_command_log: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_type: BotType::Main,
            prefix: "!".to_owned(),
            owner_ids: Vec::new(),
            dev_only_categories: vec!["owner".to_owned()],
            dev_guild_id: None,
            hide_disabled_command_log: false,
            hide_non_beta_command_log: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bot_type: env::var("BOT_TYPE")
                .map(|raw| BotType::parse(&raw))
                .unwrap_or(defaults.bot_type),
            prefix: env::var("COMMAND_PREFIX")
                .ok()
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or(defaults.prefix),
            owner_ids: env_list("OWNER_IDS")
                .iter()
                .filter_map(|raw| raw.parse().ok())
                .collect(),
            dev_only_categories: match env::var("DEV_ONLY_CATEGORIES") {
                Ok(_) => env_list("DEV_ONLY_CATEGORIES")
                    .into_iter()
                    .map(|category| category.to_lowercase())
                    .collect(),
                Err(_) => defaults.dev_only_categories,
            },
            dev_guild_id: env::var("DEV_GUILD_ID")
                .ok()
                .and_then(|raw| raw.trim().parse().ok()),
            hide_disabled_command_log: env_bool("HIDE_DISABLED_COMMAND_LOG", false),
            hide_non_beta_command_log: env_bool("HIDE_NON_BETA_COMMAND_LOG", false),
        }
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }

    pub fn is_dev_only(&self, category: &str) -> bool {
        self.dev_only_categories
            .iter()
            .any(|dev_only| dev_only == category)
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Comma separated values, trimmed, empty entries dropped.
pub fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}
