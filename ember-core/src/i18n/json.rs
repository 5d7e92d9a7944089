use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::Context as _;
use serde_json::Value;
use tracing::{debug, info};

use super::I18nProvider;

type LocaleTable = HashMap<String, String>;

/// Translations read from `<root>/<locale>/<file>.json`. The file stem is the
/// first key segment and nested objects flatten into dotted keys.
#[derive(Debug)]
pub struct JsonI18n {
    root: Option<PathBuf>,
    default_locale: String,
    locales: RwLock<HashMap<String, LocaleTable>>,
}

impl JsonI18n {
    pub fn load(root: impl Into<PathBuf>, default_locale: impl Into<String>) -> anyhow::Result<Self> {
        let i18n = Self {
            root: Some(root.into()),
            default_locale: default_locale.into(),
            locales: RwLock::new(HashMap::new()),
        };
        i18n.load_all_locales()?;
        Ok(i18n)
    }

    /// Build from in-memory trees, one per locale. Nothing to reload from.
    pub fn from_values(
        default_locale: impl Into<String>,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        let locales = values
            .into_iter()
            .map(|(locale, tree)| {
                let mut table = LocaleTable::new();
                flatten_into(&mut table, None, &tree);
                (locale, table)
            })
            .collect();

        Self {
            root: None,
            default_locale: default_locale.into(),
            locales: RwLock::new(locales),
        }
    }

    fn read_locale_dir(path: &Path) -> anyhow::Result<LocaleTable> {
        let mut table = LocaleTable::new();

        for entry in fs::read_dir(path).with_context(|| format!("failed to read {path:?}"))? {
            let file_path = entry?.path();
            if file_path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let Some(stem) = file_path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let contents = fs::read_to_string(&file_path)
                .with_context(|| format!("failed to read {file_path:?}"))?;
            let tree: Value = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {file_path:?}"))?;

            flatten_into(&mut table, Some(stem), &tree);
        }

        Ok(table)
    }
}

fn flatten_into(table: &mut LocaleTable, prefix: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = match prefix {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key.clone(),
                };
                flatten_into(table, Some(&path), child);
            }
        }
        Value::Null => {}
        Value::String(text) => {
            if let Some(prefix) = prefix {
                table.insert(prefix.to_owned(), text.clone());
            }
        }
        // Arrays are joined line by line, the way multi-line texts are written.
        Value::Array(items) => {
            if let Some(prefix) = prefix {
                let joined = items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                table.insert(prefix.to_owned(), joined);
            }
        }
        other => {
            if let Some(prefix) = prefix {
                table.insert(prefix.to_owned(), other.to_string());
            }
        }
    }
}

impl I18nProvider for JsonI18n {
    fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn available_locales(&self) -> Vec<String> {
        let locales = self.locales.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = locales.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        let locales = self.locales.read().unwrap_or_else(PoisonError::into_inner);
        locales.get(locale)?.get(key).cloned()
    }

    fn load_all_locales(&self) -> anyhow::Result<()> {
        let Some(root) = &self.root else {
            return Ok(());
        };

        let mut loaded = HashMap::new();
        for entry in fs::read_dir(root).with_context(|| format!("failed to read {root:?}"))? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }

            let Some(locale) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            let table = Self::read_locale_dir(&path)?;
            debug!(locale, keys = table.len(), "loaded locale");
            loaded.insert(locale.to_owned(), table);
        }

        if !loaded.contains_key(&self.default_locale) {
            anyhow::bail!(
                "default locale `{}` not found in {root:?}",
                self.default_locale
            );
        }

        info!(locales = loaded.len(), "translations loaded");
        *self.locales.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_nested_values() {
        let i18n = JsonI18n::from_values(
            "en",
            [(
                "en".to_owned(),
                json!({
                    "a": { "b": "text", "n": 5, "lines": ["one", "two"], "skip": null }
                }),
            )],
        );

        assert_eq!(i18n.lookup("en", "a.b").as_deref(), Some("text"));
        assert_eq!(i18n.lookup("en", "a.n").as_deref(), Some("5"));
        assert_eq!(i18n.lookup("en", "a.lines").as_deref(), Some("one\ntwo"));
        assert_eq!(i18n.lookup("en", "a.skip"), None);
        assert_eq!(i18n.lookup("fr", "a.b"), None);
        assert!(i18n.load_all_locales().is_ok());
    }

    #[test]
    fn loads_and_reloads_locale_directories() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let root = std::env::temp_dir().join(format!("ember-i18n-{}-{nanos}", std::process::id()));
        fs::create_dir_all(root.join("en")).unwrap();
        fs::create_dir_all(root.join("de")).unwrap();
        fs::write(root.join("en/global.json"), r#"{ "none": "None" }"#).unwrap();
        fs::write(root.join("de/global.json"), r#"{ "none": "Keine" }"#).unwrap();
        fs::write(root.join("de/notes.txt"), "ignored").unwrap();

        let i18n = JsonI18n::load(&root, "en").unwrap();
        assert_eq!(i18n.available_locales(), vec!["de", "en"]);
        assert_eq!(i18n.lookup("de", "global.none").as_deref(), Some("Keine"));

        fs::write(root.join("de/global.json"), r#"{ "none": "Nichts" }"#).unwrap();
        i18n.load_all_locales().unwrap();
        assert_eq!(i18n.lookup("de", "global.none").as_deref(), Some("Nichts"));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_default_locale_is_an_error() {
        let root = std::env::temp_dir().join(format!("ember-i18n-empty-{}", std::process::id()));
        fs::create_dir_all(root.join("de")).unwrap();

        assert!(JsonI18n::load(&root, "en").is_err());

        fs::remove_dir_all(&root).unwrap();
    }
}
