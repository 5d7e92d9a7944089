use anyhow::anyhow;
use serenity::all::{Cache, ChannelId, Context, GuildId, Member, Permissions, UserId};

/// Convert a permission bitset into a sorted display list.
///
/// If `ADMINISTRATOR` is present, only `ADMINISTRATOR` is returned because
/// it implicitly grants all permissions.
pub fn permission_names(perms: Permissions) -> Vec<String> {
    if perms.contains(Permissions::ADMINISTRATOR) {
        return vec!["ADMINISTRATOR".to_owned()];
    }

    let mut names: Vec<String> = perms
        .iter_names()
        .map(|(name, _flag)| name.to_owned())
        .collect();
    names.sort_unstable();
    names
}

/// `SEND_MESSAGES` -> `SendMessages`, the form used for translation keys.
pub fn permission_key(flag_name: &str) -> String {
    flag_name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!(
                    "{}{}",
                    first.to_ascii_uppercase(),
                    chars.as_str().to_ascii_lowercase()
                ),
                None => String::new(),
            }
        })
        .collect()
}

/// Permissions from `required` that `granted` lacks. Administrators lack nothing.
pub fn missing_permissions(granted: Permissions, required: Permissions) -> Permissions {
    if granted.contains(Permissions::ADMINISTRATOR) {
        return Permissions::empty();
    }

    required - granted
}

/// Permissions of `user_id` in a channel, with its overwrites applied.
///
/// The member comes from the cache when present; only a miss goes over HTTP.
pub async fn resolve_channel_permissions(
    serenity: &Context,
    guild_id: GuildId,
    channel_id: ChannelId,
    user_id: UserId,
) -> anyhow::Result<Permissions> {
    let member = guild_id.member(serenity, user_id).await?;

    cached_channel_permissions(&serenity.cache, guild_id, channel_id, &member)
        .ok_or_else(|| anyhow!("guild {guild_id} or channel {channel_id} is not cached"))
}

/// Threads take the overwrites of their parent channel.
pub fn cached_channel_permissions(
    cache: &Cache,
    guild_id: GuildId,
    channel_id: ChannelId,
    member: &Member,
) -> Option<Permissions> {
    let guild = cache.guild(guild_id)?;
    let channel = guild.channels.get(&channel_id).or_else(|| {
        let parent_id = guild
            .threads
            .iter()
            .find(|thread| thread.id == channel_id)?
            .parent_id?;
        guild.channels.get(&parent_id)
    })?;

    Some(guild.user_permissions_in(channel, member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_collapses_names() {
        let perms = Permissions::ADMINISTRATOR | Permissions::SEND_MESSAGES;
        assert_eq!(permission_names(perms), vec!["ADMINISTRATOR"]);
    }

    #[test]
    fn names_are_sorted() {
        let perms = Permissions::VIEW_CHANNEL | Permissions::BAN_MEMBERS;
        assert_eq!(permission_names(perms), vec!["BAN_MEMBERS", "VIEW_CHANNEL"]);
    }

    #[test]
    fn keys_are_pascal_case() {
        assert_eq!(permission_key("SEND_MESSAGES"), "SendMessages");
        assert_eq!(permission_key("ADMINISTRATOR"), "Administrator");
    }

    #[test]
    fn missing_ignores_granted_and_admins() {
        let required = Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS;
        assert_eq!(
            missing_permissions(Permissions::SEND_MESSAGES, required),
            Permissions::EMBED_LINKS
        );
        assert!(missing_permissions(Permissions::ADMINISTRATOR, required).is_empty());
    }

    #[test]
    fn uncached_guilds_resolve_nothing() {
        let cache = Cache::new();
        let resolved = cached_channel_permissions(
            &cache,
            GuildId::new(1),
            ChannelId::new(2),
            &Member::default(),
        );
        assert_eq!(resolved, None);
    }
}
