use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;

use ember_core::Data;
use ember_core::Translator;
use ember_core::limits::{AUTOCOMPLETE_OPTIONS_MAX_AMOUNT, CHOICE_NAME_MAX_LENGTH};
use ember_utils::formatting::truncate_chars;

use super::choice::ChoiceValue;
use super::registry::CommandRegistry;

/// One autocomplete entry. `Key` is translated for display and doubles as its
/// own value; `Pair` is shown as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum AutocompleteItem {
    Key(String),
    Pair { name: String, value: ChoiceValue },
}

impl AutocompleteItem {
    pub fn pair(name: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self::Pair {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Text the query is matched against.
    fn search_text(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Pair { value, .. } => match value {
                ChoiceValue::String(text) => Cow::Borrowed(text),
                other => Cow::Owned(other.to_string()),
            },
        }
    }

    fn resolve(&self, lang: &Translator) -> Suggestion {
        let (name, value) = match self {
            Self::Key(key) => (
                lang.get(key).unwrap_or_else(|| key.clone()),
                ChoiceValue::String(key.clone()),
            ),
            Self::Pair { name, value } => (name.clone(), value.clone()),
        };

        Suggestion {
            name: truncate_chars(&name, CHOICE_NAME_MAX_LENGTH),
            value,
        }
    }
}

impl From<&str> for AutocompleteItem {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for AutocompleteItem {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// A formatted entry ready to be sent as an autocomplete choice.
#[derive(Clone, Debug, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub value: ChoiceValue,
}

/// What a provider gets to compute its items from.
#[derive(Clone, Copy)]
pub struct AutocompleteQuery<'a> {
    /// What the user typed so far.
    pub query: &'a str,
    pub locale: &'a str,
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub registry: &'a CommandRegistry,
    pub data: Option<&'a Data>,
}

pub type AutocompleteFuture<'a> =
    Pin<Box<dyn Future<Output = anyhow::Result<Vec<AutocompleteItem>>> + Send + 'a>>;

pub type AutocompleteFn = for<'a> fn(AutocompleteQuery<'a>) -> AutocompleteFuture<'a>;

#[derive(Clone)]
pub enum AutocompleteSource {
    Items(Vec<AutocompleteItem>),
    Provider(AutocompleteFn),
}

impl std::fmt::Debug for AutocompleteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Items(items) => f.debug_tuple("Items").field(items).finish(),
            Self::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// Resolve `source` against the query: case-insensitive substring match on
/// the item value, at most 25 entries, `Key` items translated through `lang`.
pub async fn format_autocomplete(
    source: &AutocompleteSource,
    query: AutocompleteQuery<'_>,
    lang: &Translator,
) -> anyhow::Result<Vec<Suggestion>> {
    let items = match source {
        AutocompleteSource::Items(items) => Cow::Borrowed(items.as_slice()),
        AutocompleteSource::Provider(provider) => Cow::Owned(provider(query).await?),
    };

    let needle = query.query.trim().to_lowercase();

    Ok(items
        .iter()
        .filter(|item| needle.is_empty() || item.search_text().to_lowercase().contains(&needle))
        .take(AUTOCOMPLETE_OPTIONS_MAX_AMOUNT)
        .map(|item| item.resolve(lang))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ember_core::{I18nProvider, JsonI18n};
    use serde_json::json;

    use super::*;

    fn lang() -> Translator {
        let provider: Arc<dyn I18nProvider> = Arc::new(JsonI18n::from_values(
            "en",
            [(
                "en".to_owned(),
                json!({ "commands": { "fun": { "roll": { "options": { "kind": {
                    "choices": { "coin": "Flip a coin", "dice": "Roll a die" }
                } } } } } }),
            )],
        ));
        Translator::new(provider, "en")
            .with_backup_path("commands.fun.roll.options.kind.choices")
            .without_default_fallback()
    }

    fn query<'a>(registry: &'a CommandRegistry, text: &'a str) -> AutocompleteQuery<'a> {
        AutocompleteQuery {
            query: text,
            locale: "en",
            user_id: 1,
            guild_id: None,
            registry,
            data: None,
        }
    }

    fn numbers<'a>(_query: AutocompleteQuery<'a>) -> AutocompleteFuture<'a> {
        Box::pin(async move {
            Ok((1..=40)
                .map(|n| AutocompleteItem::pair(format!("#{n}"), n))
                .collect())
        })
    }

    #[tokio::test]
    async fn keys_are_translated_and_filtered_by_value() {
        let registry = CommandRegistry::default();
        let source = AutocompleteSource::Items(vec!["coin".into(), "dice".into(), "cards".into()]);

        let all = format_autocomplete(&source, query(&registry, ""), &lang())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Flip a coin");
        assert_eq!(all[2].name, "cards");

        let filtered = format_autocomplete(&source, query(&registry, "DI"), &lang())
            .await
            .unwrap();
        assert_eq!(
            filtered,
            vec![Suggestion {
                name: "Roll a die".to_owned(),
                value: ChoiceValue::from("dice"),
            }]
        );
    }

    #[tokio::test]
    async fn provider_output_is_capped_at_limit() {
        let registry = CommandRegistry::default();
        let source = AutocompleteSource::Provider(numbers);

        let all = format_autocomplete(&source, query(&registry, ""), &lang())
            .await
            .unwrap();
        assert_eq!(all.len(), AUTOCOMPLETE_OPTIONS_MAX_AMOUNT);

        let threes = format_autocomplete(&source, query(&registry, "3"), &lang())
            .await
            .unwrap();
        assert_eq!(
            threes.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            ["#3", "#13", "#23", "#30", "#31", "#32", "#33", "#34", "#35", "#36", "#37", "#38", "#39"]
        );
    }

    #[tokio::test]
    async fn long_names_are_truncated() {
        let registry = CommandRegistry::default();
        let source = AutocompleteSource::Items(vec![AutocompleteItem::pair("x".repeat(150), "x")]);

        let out = format_autocomplete(&source, query(&registry, ""), &lang())
            .await
            .unwrap();
        assert_eq!(out[0].name.chars().count(), CHOICE_NAME_MAX_LENGTH);
    }
}
