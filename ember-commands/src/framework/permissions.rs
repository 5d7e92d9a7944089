use ember_core::Translator;
use ember_utils::permissions::{permission_key, permission_names};
use serenity::all::Permissions;

/// Display names of `perms` from `others.Perms.{Name}`, falling back to the
/// Discord flag name.
pub fn translate_permissions(perms: Permissions, lang: &Translator) -> Vec<String> {
    permission_names(perms)
        .into_iter()
        .map(|flag| {
            lang.get(&format!("others.Perms.{}", permission_key(&flag)))
                .unwrap_or(flag)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::test_support::i18n;

    #[test]
    fn translates_known_flags() {
        let lang = Translator::new(i18n(), "de");
        let names = translate_permissions(
            Permissions::MANAGE_GUILD | Permissions::SEND_MESSAGES | Permissions::BAN_MEMBERS,
            &lang,
        );
        assert_eq!(names, ["BAN_MEMBERS", "Server verwalten", "Nachrichten senden"]);
    }
}
