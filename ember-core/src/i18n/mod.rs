mod json;

use std::fmt;
use std::sync::Arc;

pub use json::JsonI18n;

use crate::error::DefinitionError;

/// Source of translated strings, keyed by dotted paths such as
/// `commands.utility.ping.description`.
pub trait I18nProvider: Send + Sync + fmt::Debug {
    fn default_locale(&self) -> &str;

    fn available_locales(&self) -> Vec<String>;

    fn lookup(&self, locale: &str, key: &str) -> Option<String>;

    /// Re-read every locale from its backing store.
    fn load_all_locales(&self) -> anyhow::Result<()>;
}

/// Locales Discord accepts in localization maps.
pub const DISCORD_LOCALES: &[&str] = &[
    "id", "da", "de", "en-GB", "en-US", "es-ES", "es-419", "fr", "hr", "it", "lt", "hu", "nl",
    "no", "pl", "pt-BR", "ro", "fi", "sv-SE", "vi", "tr", "cs", "el", "bg", "ru", "uk", "hi",
    "th", "zh-CN", "ja", "zh-TW", "ko",
];

/// Map an i18n locale onto the Discord locale it should be published under.
pub fn discord_locale(locale: &str) -> Option<&'static str> {
    if let Some(exact) = DISCORD_LOCALES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(locale))
    {
        return Some(*exact);
    }

    let language = locale.split(['-', '_']).next()?.to_ascii_lowercase();
    match language.as_str() {
        "en" => Some("en-US"),
        "es" => Some("es-ES"),
        "pt" => Some("pt-BR"),
        "sv" => Some("sv-SE"),
        "zh" => Some("zh-CN"),
        _ => DISCORD_LOCALES.iter().find(|known| **known == language).copied(),
    }
}

/// Pick the provider locale closest to a locale reported by Discord.
pub fn negotiate_locale(requested: &str, provider: &dyn I18nProvider) -> String {
    let available = provider.available_locales();
    if available.iter().any(|locale| locale == requested) {
        return requested.to_owned();
    }

    let language = requested.split(['-', '_']).next().unwrap_or(requested);
    available
        .iter()
        .find(|locale| locale.as_str() == language)
        .or_else(|| {
            available
                .iter()
                .find(|locale| locale.split(['-', '_']).next() == Some(language))
        })
        .cloned()
        .unwrap_or_else(|| provider.default_locale().to_owned())
}

/// Locale-bound view on a provider. Keys are tried as given, then below each
/// backup path in order, then (unless disabled) in the default locale.
#[derive(Clone, Debug)]
pub struct Translator {
    provider: Arc<dyn I18nProvider>,
    locale: String,
    backup_paths: Vec<String>,
    fallback_to_default: bool,
}

impl Translator {
    pub fn new(provider: Arc<dyn I18nProvider>, locale: impl Into<String>) -> Self {
        Self {
            provider,
            locale: locale.into(),
            backup_paths: Vec::new(),
            fallback_to_default: true,
        }
    }

    pub fn with_backup_path(mut self, path: impl Into<String>) -> Self {
        self.backup_paths.push(path.into());
        self
    }

    /// Replace the first backup path, keeping any others behind it.
    pub fn with_primary_backup_path(mut self, path: impl Into<String>) -> Self {
        match self.backup_paths.first_mut() {
            Some(first) => *first = path.into(),
            None => self.backup_paths.push(path.into()),
        }
        self
    }

    pub fn without_default_fallback(mut self) -> Self {
        self.fallback_to_default = false;
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn provider(&self) -> &Arc<dyn I18nProvider> {
        &self.provider
    }

    pub fn is_default_locale(&self) -> bool {
        self.locale == self.provider.default_locale()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let default_locale = self.provider.default_locale();
        let fallback = (self.fallback_to_default && self.locale != default_locale)
            .then_some(default_locale);

        std::iter::once(self.locale.as_str())
            .chain(fallback)
            .find_map(|locale| self.lookup_in(locale, key))
    }

    fn lookup_in(&self, locale: &str, key: &str) -> Option<String> {
        self.provider.lookup(locale, key).or_else(|| {
            self.backup_paths
                .iter()
                .find_map(|path| self.provider.lookup(locale, &format!("{path}.{key}")))
        })
    }

    /// Translation or the key itself.
    pub fn t(&self, key: &str) -> String {
        self.get(key).unwrap_or_else(|| key.to_owned())
    }

    /// Translation with `{name}` placeholders substituted.
    pub fn t_with(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        replacements
            .iter()
            .fold(self.t(key), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    pub fn require(&self, key: &str) -> Result<String, DefinitionError> {
        self.get(key).ok_or_else(|| DefinitionError::MissingTranslation {
            locale: self.locale.clone(),
            key: match self.backup_paths.first() {
                Some(path) => format!("{path}.{key}"),
                None => key.to_owned(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn provider() -> Arc<dyn I18nProvider> {
        Arc::new(JsonI18n::from_values(
            "en",
            [
                (
                    "en".to_owned(),
                    json!({
                        "global": { "none": "None" },
                        "events": { "command": { "cooldown": "Wait {time}." } },
                        "commands": { "utility": { "ping": { "description": "Pong" } } }
                    }),
                ),
                (
                    "de".to_owned(),
                    json!({ "events": { "command": { "cooldown": "Warte {time}." } } }),
                ),
            ],
        ))
    }

    #[test]
    fn backup_paths_are_tried_after_the_key() {
        let lang = Translator::new(provider(), "en").with_backup_path("commands.utility.ping");
        assert_eq!(lang.get("description").as_deref(), Some("Pong"));
        assert_eq!(lang.get("global.none").as_deref(), Some("None"));
        assert_eq!(lang.get("missing"), None);
        assert_eq!(lang.t("missing"), "missing");
    }

    #[test]
    fn falls_back_to_default_locale_unless_disabled() {
        let lang = Translator::new(provider(), "de").with_backup_path("commands.utility.ping");
        assert_eq!(lang.get("description").as_deref(), Some("Pong"));

        let strict = lang.without_default_fallback();
        assert_eq!(strict.get("description"), None);
        assert_eq!(
            strict.require("description"),
            Err(DefinitionError::MissingTranslation {
                locale: "de".to_owned(),
                key: "commands.utility.ping.description".to_owned(),
            })
        );
    }

    #[test]
    fn placeholders_are_substituted() {
        let lang = Translator::new(provider(), "de").with_backup_path("events.command");
        assert_eq!(lang.t_with("cooldown", &[("time", "5s")]), "Warte 5s.");
    }

    #[test]
    fn primary_backup_path_is_replaced() {
        let lang = Translator::new(provider(), "en")
            .with_backup_path("commands.utility.ping")
            .with_primary_backup_path("events.command");
        assert_eq!(lang.t_with("cooldown", &[("time", "1s")]), "Wait 1s.");
        assert_eq!(lang.get("description"), None);
    }

    #[test]
    fn maps_locales_to_discord() {
        assert_eq!(discord_locale("en"), Some("en-US"));
        assert_eq!(discord_locale("de"), Some("de"));
        assert_eq!(discord_locale("en-gb"), Some("en-GB"));
        assert_eq!(discord_locale("de-AT"), Some("de"));
        assert_eq!(discord_locale("xx"), None);
    }

    #[test]
    fn negotiates_closest_locale() {
        let provider = provider();
        assert_eq!(negotiate_locale("de", provider.as_ref()), "de");
        assert_eq!(negotiate_locale("en-US", provider.as_ref()), "en");
        assert_eq!(negotiate_locale("ja", provider.as_ref()), "en");
    }
}
