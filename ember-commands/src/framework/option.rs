use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ember_core::i18n::{discord_locale, negotiate_locale};
use ember_core::limits::{CHOICE_NAME_MAX_LENGTH, CHOICE_NAME_MIN_LENGTH, CHOICES_MAX_AMOUNT};
use ember_core::{Cooldowns, DefinitionError, I18nProvider, Translator};
use ember_utils::formatting::{char_len, truncate_chars};
use serde_json::Number;
use serenity::all::{ChannelType, CommandOptionType};
use tracing::warn;

use super::autocomplete::{AutocompleteQuery, AutocompleteSource, Suggestion, format_autocomplete};
use super::choice::{Choice, ChoiceValue};
use super::context::RunFn;
use super::localize::{LocalizeTarget, localize_description};
use super::payload::{ChoicePayload, OptionPayload};
use super::validate::{fix_name_case, validate_name};

/// Declarative form of an option, as written in command modules.
#[derive(Clone)]
pub struct OptionConfig {
    pub name: String,
    pub kind: CommandOptionType,
    pub required: bool,
    pub cooldowns: Cooldowns,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
    /// Reject values that are not among the generated suggestions.
    pub strict_autocomplete: bool,
    pub autocomplete_options: Option<AutocompleteSource>,
    pub choices: Vec<ChoiceValue>,
    pub channel_types: Vec<ChannelType>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub options: Vec<OptionConfig>,
    pub run: Option<RunFn>,
}

impl Default for OptionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: CommandOptionType::String,
            required: false,
            cooldowns: Cooldowns::default(),
            disabled: false,
            disabled_reason: None,
            strict_autocomplete: false,
            autocomplete_options: None,
            choices: Vec::new(),
            channel_types: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            options: Vec::new(),
            run: None,
        }
    }
}

impl OptionConfig {
    pub fn new(name: impl Into<String>, kind: CommandOptionType) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct CommandOption {
    pub name: String,
    /// Translation root, `{parent id}.options.{name}`.
    pub id: String,
    pub description: String,
    pub name_localizations: HashMap<String, String>,
    pub description_localizations: HashMap<String, String>,
    pub kind: CommandOptionType,
    pub required: bool,
    pub cooldowns: Cooldowns,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
    pub strict_autocomplete: bool,
    pub autocomplete_options: Option<AutocompleteSource>,
    pub choices: Vec<Choice>,
    pub channel_types: Vec<ChannelType>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub options: Vec<CommandOption>,
    pub run: Option<RunFn>,
}

impl fmt::Debug for CommandOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOption")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("choices", &self.choices.len())
            .field("autocomplete", &self.autocomplete())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CommandOption {
    pub fn new(config: OptionConfig) -> Self {
        Self {
            name: config.name,
            id: String::new(),
            description: String::new(),
            name_localizations: HashMap::new(),
            description_localizations: HashMap::new(),
            kind: config.kind,
            required: config.required,
            cooldowns: config.cooldowns,
            disabled: config.disabled,
            disabled_reason: config.disabled_reason,
            strict_autocomplete: config.strict_autocomplete,
            autocomplete_options: config.autocomplete_options,
            choices: config.choices.into_iter().map(Choice::new).collect(),
            channel_types: config.channel_types,
            min_value: config.min_value,
            max_value: config.max_value,
            min_length: config.min_length,
            max_length: config.max_length,
            options: config.options.into_iter().map(Self::new).collect(),
            run: config.run,
        }
    }

    pub fn autocomplete(&self) -> bool {
        self.autocomplete_options.is_some()
    }

    /// Assign ids, validate and localize this option and its sub-options.
    pub fn init(
        mut self,
        i18n: &Arc<dyn I18nProvider>,
        parent_id: &str,
    ) -> Result<Self, DefinitionError> {
        let pre_fix_id = format!("{parent_id}.options.{}", self.name);
        fix_name_case(&mut self.name, "Option", &pre_fix_id, self.disabled);
        self.id = format!("{parent_id}.options.{}", self.name);

        self.validate()?;
        self.localize(i18n)?;

        let id = self.id.clone();
        self.options = std::mem::take(&mut self.options)
            .into_iter()
            .map(|option| option.init(i18n, &id))
            .collect::<Result<_, _>>()?;

        Ok(self)
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        validate_name(&self.name, &self.id)?;

        let numeric = matches!(
            self.kind,
            CommandOptionType::Number | CommandOptionType::Integer
        );
        if numeric && (self.min_length.is_some() || self.max_length.is_some()) {
            return Err(DefinitionError::LengthOnNumeric {
                id: self.id.clone(),
            });
        }

        if self.kind == CommandOptionType::String
            && (self.min_value.is_some() || self.max_value.is_some())
        {
            return Err(DefinitionError::ValueOnString {
                id: self.id.clone(),
            });
        }

        if !self.choices.is_empty() && self.autocomplete() {
            return Err(DefinitionError::ChoicesWithAutocomplete {
                id: self.id.clone(),
            });
        }

        if self.choices.len() > CHOICES_MAX_AMOUNT {
            return Err(DefinitionError::TooManyChoices {
                id: self.id.clone(),
                name: self.name.clone(),
                count: self.choices.len(),
                max: CHOICES_MAX_AMOUNT,
            });
        }

        Ok(())
    }

    fn localize(&mut self, i18n: &Arc<dyn I18nProvider>) -> Result<(), DefinitionError> {
        for locale in i18n.available_locales() {
            let lang = Translator::new(i18n.clone(), locale)
                .with_backup_path(self.id.clone())
                .without_default_fallback();

            let target = LocalizeTarget {
                kind: "option",
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

            self.localize_choices(&lang);
        }

        Ok(())
    }

    fn localize_choices(&mut self, lang: &Translator) {
        let locale = lang.locale();
        let discord = discord_locale(locale);

        for choice in &mut self.choices {
            let value = choice.value.to_string();
            let localized = lang
                .get(&format!("choices.{value}"))
                .unwrap_or_else(|| value.clone());

            let length = char_len(&localized);
            if length < CHOICE_NAME_MIN_LENGTH {
                if !self.disabled {
                    warn!(
                        "\"{locale}\" choice name and value for \"{value}\" in option \"{}\" ({}) are too short (min length is {CHOICE_NAME_MIN_LENGTH})! Skipping.",
                        self.name, self.id
                    );
                }
                continue;
            }

            if length > CHOICE_NAME_MAX_LENGTH && !self.disabled {
                warn!(
                    "\"{locale}\" choice name for \"{value}\" in option \"{}\" ({}) is too long (max length is {CHOICE_NAME_MAX_LENGTH})! Slicing.",
                    self.name, self.id
                );
            }
            let localized = truncate_chars(&localized, CHOICE_NAME_MAX_LENGTH);

            if lang.is_default_locale() {
                choice.name = localized;
            } else if let Some(discord) = discord {
                choice.name_localizations.insert(discord.to_owned(), localized);
            }
        }
    }

    pub fn to_payload(&self) -> OptionPayload {
        OptionPayload {
            kind: u8::from(self.kind),
            name: self.name.clone(),
            name_localizations: self.name_localizations.clone(),
            description: self.description.clone(),
            description_localizations: self.description_localizations.clone(),
            required: self.required,
            choices: self
                .choices
                .iter()
                .map(|choice| ChoicePayload {
                    name: choice.name.clone(),
                    name_localizations: choice.name_localizations.clone(),
                    value: choice.value.clone(),
                })
                .collect(),
            options: self.options.iter().map(Self::to_payload).collect(),
            channel_types: self.channel_types.iter().map(|kind| u8::from(*kind)).collect(),
            min_value: self.min_value.and_then(|value| number_bound(self.kind, value)),
            max_value: self.max_value.and_then(|value| number_bound(self.kind, value)),
            min_length: self.min_length,
            max_length: self.max_length,
            autocomplete: self.autocomplete(),
        }
    }

    pub fn is_equal_to(&self, other: &CommandOption) -> bool {
        self.to_payload().same_as(&other.to_payload())
    }

    /// Suggestions for `query`, translated with the `{id}.choices` keys.
    /// Options without autocomplete yield nothing.
    pub async fn generate_autocomplete(
        &self,
        query: AutocompleteQuery<'_>,
        i18n: &Arc<dyn I18nProvider>,
    ) -> anyhow::Result<Vec<Suggestion>> {
        let Some(source) = &self.autocomplete_options else {
            return Ok(Vec::new());
        };

        let locale = negotiate_locale(query.locale, i18n.as_ref());
        let lang =
            Translator::new(i18n.clone(), locale).with_backup_path(format!("{}.choices", self.id));

        format_autocomplete(source, query, &lang).await
    }
}

/// Integer options publish whole-number bounds as JSON integers.
fn number_bound(kind: CommandOptionType, value: f64) -> Option<Number> {
    if kind == CommandOptionType::Integer && value.fract() == 0.0 && value.abs() < 9.0e15 {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::test_support::i18n;

    fn sides() -> OptionConfig {
        OptionConfig {
            required: true,
            choices: vec![6.into(), 20.into(), 100.into()],
            ..OptionConfig::new("Sides", CommandOptionType::Integer)
        }
    }

    #[test]
    fn init_fixes_name_and_localizes() {
        let option = CommandOption::new(sides())
            .init(&i18n(), "commands.fun.roll")
            .unwrap();

        assert_eq!(option.name, "sides");
        assert_eq!(option.id, "commands.fun.roll.options.sides");
        assert_eq!(option.description, "Number of sides");
        assert_eq!(
            option.description_localizations.get("de").map(String::as_str),
            Some("Anzahl der Seiten")
        );

        assert_eq!(option.choices[0].name, "Six sides");
        assert_eq!(
            option.choices[0].name_localizations.get("de").map(String::as_str),
            Some("Sechs Seiten")
        );
        assert_eq!(option.choices[2].name, "100");
    }

    #[test]
    fn rejects_conflicting_constraints() {
        let lengths = OptionConfig {
            min_length: Some(1),
            ..OptionConfig::new("sides", CommandOptionType::Integer)
        };
        assert!(matches!(
            CommandOption::new(lengths).init(&i18n(), "commands.fun.roll"),
            Err(DefinitionError::LengthOnNumeric { .. })
        ));

        let values = OptionConfig {
            max_value: Some(3.0),
            ..OptionConfig::new("sides", CommandOptionType::String)
        };
        assert!(matches!(
            CommandOption::new(values).init(&i18n(), "commands.fun.roll"),
            Err(DefinitionError::ValueOnString { .. })
        ));

        let both = OptionConfig {
            autocomplete_options: Some(AutocompleteSource::Items(Vec::new())),
            ..sides()
        };
        assert!(matches!(
            CommandOption::new(both).init(&i18n(), "commands.fun.roll"),
            Err(DefinitionError::ChoicesWithAutocomplete { .. })
        ));

        let many = OptionConfig {
            choices: (0..26).map(ChoiceValue::from).collect(),
            ..OptionConfig::new("sides", CommandOptionType::Integer)
        };
        assert!(matches!(
            CommandOption::new(many).init(&i18n(), "commands.fun.roll"),
            Err(DefinitionError::TooManyChoices { count: 26, .. })
        ));
    }

    #[test]
    fn default_locale_description_is_required() {
        let option = OptionConfig::new("unknown", CommandOptionType::String);
        let err = CommandOption::new(option)
            .init(&i18n(), "commands.fun.roll")
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MissingTranslation {
                locale: "en".to_owned(),
                key: "commands.fun.roll.options.unknown.description".to_owned(),
            }
        );
    }

    #[test]
    fn short_choice_names_are_skipped() {
        let option = OptionConfig {
            choices: vec![5.into()],
            ..OptionConfig::new("sides", CommandOptionType::Integer)
        };
        let option = CommandOption::new(option)
            .init(&i18n(), "commands.fun.roll")
            .unwrap();
        // "5" is too short and has no translation, so the value text stays
        assert_eq!(option.choices[0].name, "5");
        assert!(option.choices[0].name_localizations.is_empty());
    }

    #[test]
    fn integer_bounds_serialize_as_integers() {
        let option = OptionConfig {
            min_value: Some(2.0),
            max_value: Some(2.5),
            ..OptionConfig::new("sides", CommandOptionType::Integer)
        };
        let payload = CommandOption::new(option)
            .init(&i18n(), "commands.fun.roll")
            .unwrap()
            .to_payload();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["min_value"], serde_json::json!(2));
        assert_eq!(json["max_value"], serde_json::json!(2.5));
    }

    #[test]
    fn equality_covers_nested_fields() {
        let base = CommandOption::new(sides())
            .init(&i18n(), "commands.fun.roll")
            .unwrap();

        let mut other = base.clone();
        assert!(base.is_equal_to(&other));

        other.required = false;
        assert!(!base.is_equal_to(&other));

        let mut other = base.clone();
        other.choices[1].name_localizations.clear();
        assert!(!base.is_equal_to(&other));

        let mut other = base.clone();
        other.choices.reverse();
        assert!(base.is_equal_to(&other));
    }
}
