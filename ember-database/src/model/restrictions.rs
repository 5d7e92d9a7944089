use serde::{Deserialize, Serialize};

/// Which kind of id a guild restriction entry targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionScope {
    User,
    Channel,
    Role,
}

impl RestrictionScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "channel" => Some(Self::Channel),
            "role" => Some(Self::Role),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionTarget {
    Everyone,
    Id(u64),
}

impl RestrictionTarget {
    /// Database encoding: `0` stands for everyone.
    pub fn from_column(raw: u64) -> Self {
        if raw == 0 { Self::Everyone } else { Self::Id(raw) }
    }

    pub fn to_column(self) -> u64 {
        match self {
            Self::Everyone => 0,
            Self::Id(id) => id,
        }
    }

    pub fn matches(self, id: u64) -> bool {
        match self {
            Self::Everyone => true,
            Self::Id(target) => target == id,
        }
    }
}

/// Per-guild list of who may not use a command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRestriction {
    pub users: Vec<RestrictionTarget>,
    pub channels: Vec<RestrictionTarget>,
    pub roles: Vec<RestrictionTarget>,
}

impl CommandRestriction {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.channels.is_empty() && self.roles.is_empty()
    }

    pub fn push(&mut self, scope: RestrictionScope, target: RestrictionTarget) {
        let list = match scope {
            RestrictionScope::User => &mut self.users,
            RestrictionScope::Channel => &mut self.channels,
            RestrictionScope::Role => &mut self.roles,
        };

        if !list.contains(&target) {
            list.push(target);
        }
    }

    /// First scope that blocks the caller, checked user, channel, then roles.
    pub fn blocking_scope(
        &self,
        user_id: u64,
        channel_id: u64,
        role_ids: &[u64],
    ) -> Option<RestrictionScope> {
        if self.users.iter().any(|target| target.matches(user_id)) {
            return Some(RestrictionScope::User);
        }

        if self.channels.iter().any(|target| target.matches(channel_id)) {
            return Some(RestrictionScope::Channel);
        }

        let role_blocked = self.roles.iter().any(|target| match target {
            RestrictionTarget::Everyone => true,
            RestrictionTarget::Id(role) => role_ids.contains(role),
        });

        role_blocked.then_some(RestrictionScope::Role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everyone_targets_block_all_ids() {
        let mut restriction = CommandRestriction::default();
        restriction.push(RestrictionScope::Channel, RestrictionTarget::Everyone);

        assert_eq!(
            restriction.blocking_scope(1, 999, &[]),
            Some(RestrictionScope::Channel)
        );
    }

    #[test]
    fn scopes_are_checked_in_order() {
        let mut restriction = CommandRestriction::default();
        restriction.push(RestrictionScope::Role, RestrictionTarget::Id(7));
        restriction.push(RestrictionScope::User, RestrictionTarget::Id(1));

        assert_eq!(
            restriction.blocking_scope(1, 2, &[7]),
            Some(RestrictionScope::User)
        );
        assert_eq!(
            restriction.blocking_scope(5, 2, &[3, 7]),
            Some(RestrictionScope::Role)
        );
        assert_eq!(restriction.blocking_scope(5, 2, &[3]), None);
    }

    #[test]
    fn push_deduplicates() {
        let mut restriction = CommandRestriction::default();
        restriction.push(RestrictionScope::User, RestrictionTarget::Id(1));
        restriction.push(RestrictionScope::User, RestrictionTarget::Id(1));

        assert_eq!(restriction.users.len(), 1);
        assert!(!restriction.is_empty());
    }

    #[test]
    fn column_encoding_uses_zero_for_everyone() {
        assert_eq!(RestrictionTarget::from_column(0), RestrictionTarget::Everyone);
        assert_eq!(RestrictionTarget::from_column(5), RestrictionTarget::Id(5));
        assert_eq!(RestrictionTarget::Everyone.to_column(), 0);
        assert_eq!(RestrictionScope::parse("role"), Some(RestrictionScope::Role));
        assert_eq!(RestrictionScope::parse("guild"), None);
    }
}
