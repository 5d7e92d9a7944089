use ember_core::DefinitionError;
use ember_core::limits::NAME_MAX_LENGTH;
use ember_utils::formatting::char_len;
use tracing::error;

/// Lowercase `name` in place, logging when it had to be fixed.
pub(crate) fn fix_name_case(name: &mut String, kind: &str, id: &str, disabled: bool) {
    if !name.chars().any(char::is_uppercase) {
        return;
    }

    if !disabled {
        error!("{kind} name \"{name}\" ({id}) must be lowercase! Fixing.");
    }
    *name = name.to_lowercase();
}

/// Discord accepts 1-32 letters, digits, `-` and `_`.
pub(crate) fn validate_name(name: &str, id: &str) -> Result<(), DefinitionError> {
    let reason = if name.is_empty() {
        Some("name must not be empty")
    } else if char_len(name) > NAME_MAX_LENGTH {
        Some("name is longer than 32 characters")
    } else if !name
        .chars()
        .all(|c| c == '-' || c == '_' || c.is_alphanumeric())
    {
        Some("name contains characters Discord does not allow")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DefinitionError::InvalidName {
            id: id.to_owned(),
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_uppercase_names() {
        let mut name = "Ping".to_owned();
        fix_name_case(&mut name, "Command", "commands.utility.Ping", false);
        assert_eq!(name, "ping");
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(validate_name("ping", "x").is_ok());
        assert!(validate_name("dé-jà_vu", "x").is_ok());
        assert!(validate_name("", "x").is_err());
        assert!(validate_name("with space", "x").is_err());
        assert!(validate_name(&"a".repeat(33), "x").is_err());
    }
}
