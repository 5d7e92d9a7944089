//! Application-command JSON as Discord accepts and returns it.
//!
//! Local commands serialize into [`CommandPayload`]; registered commands
//! deserialize into [`RegisteredCommand`]. Change detection compares the two
//! shapes, treating null or absent maps and lists as empty and an absent
//! `dm_permission` as `true`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use super::choice::ChoiceValue;

/// `type` of a chat input (slash) command.
pub const CHAT_INPUT_COMMAND_TYPE: u8 = 1;

fn chat_input() -> u8 {
    CHAT_INPUT_COMMAND_TYPE
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    Text(String),
    Int(u64),
}

impl StringOrInt {
    fn parse<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Self::Text(text) => text.parse().map_err(E::custom),
            Self::Int(value) => Ok(value),
        }
    }
}

fn snowflake<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    StringOrInt::deserialize(deserializer)?.parse()
}

/// Permission bitfields travel as decimal strings.
mod permission_bits {
    use super::*;

    pub fn serialize<S: Serializer>(bits: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match bits {
            Some(bits) => serializer.serialize_str(&bits.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Option::<StringOrInt>::deserialize(deserializer)?
            .map(StringOrInt::parse)
            .transpose()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoicePayload {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub name_localizations: HashMap<String, String>,
    pub value: ChoiceValue,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OptionPayload {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub name_localizations: HashMap<String, String>,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub description_localizations: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub choices: Vec<ChoicePayload>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<OptionPayload>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub channel_types: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub autocomplete: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CommandPayload {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_localizations: HashMap<String, String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description_localizations: HashMap<String, String>,
    #[serde(rename = "type", default = "chat_input")]
    pub kind: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<OptionPayload>,
    #[serde(default, with = "permission_bits")]
    pub default_member_permissions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
}

/// An application command as currently registered with Discord.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisteredCommand {
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    #[serde(flatten)]
    pub payload: CommandPayload,
}

impl RegisteredCommand {
    pub fn from_model(command: &serenity::all::Command) -> anyhow::Result<Self> {
        let value = serde_json::to_value(command)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn name(&self) -> &str {
        &self.payload.name
    }
}

fn numbers_match(left: &Option<Number>, right: &Option<Number>) -> bool {
    left.as_ref().and_then(Number::as_f64) == right.as_ref().and_then(Number::as_f64)
}

/// Same length and every local option has an equal counterpart by name.
fn options_match(left: &[OptionPayload], right: &[OptionPayload]) -> bool {
    left.len() == right.len()
        && left.iter().all(|option| {
            right
                .iter()
                .find(|other| other.name == option.name)
                .is_some_and(|other| option.same_as(other))
        })
}

fn choices_match(left: &[ChoicePayload], right: &[ChoicePayload]) -> bool {
    left.len() == right.len()
        && left.iter().all(|choice| {
            right
                .iter()
                .find(|other| other.name == choice.name)
                .is_some_and(|other| choice == other)
        })
}

impl OptionPayload {
    pub fn same_as(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.kind == other.kind
            && self.autocomplete == other.autocomplete
            && self.required == other.required
            && numbers_match(&self.min_value, &other.min_value)
            && numbers_match(&self.max_value, &other.max_value)
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.name_localizations == other.name_localizations
            && self.description_localizations == other.description_localizations
            && choices_match(&self.choices, &other.choices)
            && self.channel_types.len() == other.channel_types.len()
            && self
                .channel_types
                .iter()
                .all(|kind| other.channel_types.contains(kind))
            && options_match(&self.options, &other.options)
    }
}

impl CommandPayload {
    pub fn same_as(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.kind == other.kind
            && self.dm_permission.unwrap_or(true) == other.dm_permission.unwrap_or(true)
            && self.default_member_permissions == other.default_member_permissions
            && self.name_localizations == other.name_localizations
            && self.description_localizations == other.description_localizations
            && options_match(&self.options, &other.options)
    }
}
