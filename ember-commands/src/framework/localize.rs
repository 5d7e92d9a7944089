use std::collections::HashMap;

use ember_core::i18n::discord_locale;
use ember_core::limits::DESCRIPTION_MAX_LENGTH;
use ember_core::{DefinitionError, Translator};
use ember_utils::formatting::{char_len, truncate_chars};
use tracing::{debug, warn};

/// What is being localized, for log lines.
pub(crate) struct LocalizeTarget<'a> {
    pub kind: &'static str,
    pub name: &'a str,
    pub id: &'a str,
    pub disabled: bool,
}

/// Fill `description` (default locale) or `localizations` (any other
/// locale Discord knows) from `lang`'s `description` key.
///
/// The default locale must provide a description. Overlong text is cut to
/// the Discord limit.
pub(crate) fn localize_description(
    lang: &Translator,
    target: &LocalizeTarget<'_>,
    description: &mut String,
    localizations: &mut HashMap<String, String>,
) -> Result<(), DefinitionError> {
    let locale = lang.locale();

    let text = if lang.is_default_locale() {
        lang.require("description")?
    } else {
        match lang.get("description") {
            Some(text) => text,
            None => {
                if !target.disabled {
                    warn!(
                        "Missing \"{locale}\" description for {} {} ({})",
                        target.kind, target.name, target.id
                    );
                }
                return Ok(());
            }
        }
    };

    if char_len(&text) > DESCRIPTION_MAX_LENGTH && !target.disabled {
        warn!(
            "\"{locale}\" description for {} {} ({}) is too long (max length is {DESCRIPTION_MAX_LENGTH})! Slicing.",
            target.kind, target.name, target.id
        );
    }
    let text = truncate_chars(&text, DESCRIPTION_MAX_LENGTH);

    if lang.is_default_locale() {
        *description = text;
        return Ok(());
    }

    match discord_locale(locale) {
        Some(discord) => {
            localizations.insert(discord.to_owned(), text);
        }
        None => debug!(locale, id = target.id, "locale unknown to Discord, skipping"),
    }

    Ok(())
}
