use ember_utils::formatting::truncate_chars;

use crate::framework::help::{CategoryListing, CommandListing};

/// Discord's limit for embed field values.
const FIELD_VALUE_MAX_LENGTH: usize = 1024;

pub fn category_field_value(category: &CategoryListing) -> String {
    let lines = category
        .list
        .iter()
        .map(|entry| format!("`{}`: {}", entry.name, entry.description))
        .collect::<Vec<_>>()
        .join("\n");

    truncate_chars(&lines, FIELD_VALUE_MAX_LENGTH)
}

/// `(name, value)` fields describing one command. Aliases are left out when
/// the command has none.
pub fn command_detail_fields(
    entry: &CommandListing,
    labels: &DetailLabels,
    permissions: &[String],
    cooldown: Option<String>,
    none: &str,
) -> Vec<(String, String)> {
    let mut fields = vec![(
        labels.usage.clone(),
        truncate_chars(&entry.usage, FIELD_VALUE_MAX_LENGTH),
    )];

    if entry.alias != none {
        fields.push((labels.aliases.clone(), entry.alias.clone()));
    }

    let permissions = if permissions.is_empty() {
        none.to_owned()
    } else {
        permissions
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    fields.push((labels.permissions.clone(), permissions));

    if let Some(cooldown) = cooldown {
        fields.push((labels.cooldown.clone(), cooldown));
    }

    fields
}

/// Translated field names of the command detail embed.
#[derive(Clone, Debug)]
pub struct DetailLabels {
    pub usage: String,
    pub aliases: String,
    pub permissions: String,
    pub cooldown: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> DetailLabels {
        DetailLabels {
            usage: "Usage".to_owned(),
            aliases: "Aliases".to_owned(),
            permissions: "Permissions".to_owned(),
            cooldown: "Cooldown".to_owned(),
        }
    }

    fn entry(alias: &str) -> CommandListing {
        CommandListing {
            name: "roll".to_owned(),
            usage: "!roll <sides>".to_owned(),
            description: "Roll a die".to_owned(),
            alias: alias.to_owned(),
        }
    }

    #[test]
    fn category_lines_list_name_and_description() {
        let category = CategoryListing {
            category: "Fun".to_owned(),
            aliases_disabled: true,
            list: vec![entry("None"), CommandListing {
                name: "coin".to_owned(),
                description: "Flip a coin".to_owned(),
                ..entry("None")
            }],
        };

        assert_eq!(
            category_field_value(&category),
            "`roll`: Roll a die\n`coin`: Flip a coin"
        );
    }

    #[test]
    fn detail_fields_skip_missing_aliases() {
        let fields = command_detail_fields(&entry("None"), &labels(), &[], None, "None");
        assert_eq!(
            fields,
            vec![
                ("Usage".to_owned(), "!roll <sides>".to_owned()),
                ("Permissions".to_owned(), "None".to_owned()),
            ]
        );

        let fields = command_detail_fields(
            &entry("Prefix: dice"),
            &labels(),
            &["Manage Server".to_owned()],
            Some("5s".to_owned()),
            "None",
        );
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[1].1, "Prefix: dice");
        assert_eq!(fields[2].1, "`Manage Server`");
        assert_eq!(fields[3].1, "5s");
    }
}
