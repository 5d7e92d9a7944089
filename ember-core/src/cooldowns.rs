use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Per-scope cooldowns of a command or subcommand. Zero disables a scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cooldowns {
    pub guild: Duration,
    pub channel: Duration,
    pub user: Duration,
}

impl Cooldowns {
    pub fn user(duration: Duration) -> Self {
        Self {
            user: duration,
            ..Self::default()
        }
    }

    pub fn is_none(&self) -> bool {
        self.guild.is_zero() && self.channel.is_zero() && self.user.is_zero()
    }
}

/// Ids the cooldown scopes are keyed by. Missing ids skip their scope.
#[derive(Clone, Copy, Debug, Default)]
pub struct CooldownScopes {
    pub guild_id: Option<u64>,
    pub channel_id: Option<u64>,
    pub user_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Scope {
    Guild,
    Channel,
    User,
}

const PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug, Default)]
pub struct CooldownTracker {
    expirations: Mutex<HashMap<(String, Scope, u64), Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining wait for `key`, or zero after stamping all active scopes.
    pub fn hit(&self, key: &str, scopes: CooldownScopes, cooldowns: Cooldowns) -> Duration {
        self.hit_all(&[(key, cooldowns)], scopes)
    }

    /// Like [`CooldownTracker::hit`] for several keys at once: nothing is
    /// stamped unless every key is off cooldown.
    pub fn hit_all(&self, entries: &[(&str, Cooldowns)], scopes: CooldownScopes) -> Duration {
        self.hit_all_at(entries, scopes, Instant::now())
    }

    fn hit_all_at(
        &self,
        entries: &[(&str, Cooldowns)],
        scopes: CooldownScopes,
        now: Instant,
    ) -> Duration {
        let active: Vec<(String, Scope, u64, Duration)> = entries
            .iter()
            .flat_map(|(key, cooldowns)| {
                [
                    (Scope::Guild, scopes.guild_id, cooldowns.guild),
                    (Scope::Channel, scopes.channel_id, cooldowns.channel),
                    (Scope::User, Some(scopes.user_id), cooldowns.user),
                ]
                .into_iter()
                .filter_map(move |(scope, id, duration)| {
                    let id = id?;
                    (!duration.is_zero()).then(|| ((*key).to_owned(), scope, id, duration))
                })
            })
            .collect();

        if active.is_empty() {
            return Duration::ZERO;
        }

        let mut expirations = self
            .expirations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let remaining = active
            .iter()
            .filter_map(|(key, scope, id, _)| expirations.get(&(key.clone(), *scope, *id)))
            .map(|expires| expires.saturating_duration_since(now))
            .max()
            .unwrap_or(Duration::ZERO);

        if !remaining.is_zero() {
            return remaining;
        }

        if expirations.len() >= PRUNE_THRESHOLD {
            expirations.retain(|_, expires| *expires > now);
        }

        for (key, scope, id, duration) in active {
            expirations.insert((key, scope, id), now + duration);
        }

        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(user_id: u64, guild_id: Option<u64>) -> CooldownScopes {
        CooldownScopes {
            guild_id,
            channel_id: Some(10),
            user_id,
        }
    }

    #[test]
    fn user_cooldown_blocks_until_expired() {
        let tracker = CooldownTracker::new();
        let cooldowns = Cooldowns::user(Duration::from_secs(5));
        let start = Instant::now();

        assert_eq!(tracker.hit_all_at(&[("ping", cooldowns)], scopes(1, None), start), Duration::ZERO);
        assert_eq!(
            tracker.hit_all_at(&[("ping", cooldowns)], scopes(1, None), start + Duration::from_secs(2)),
            Duration::from_secs(3)
        );
        assert_eq!(tracker.hit_all_at(&[("ping", cooldowns)], scopes(2, None), start), Duration::ZERO);
        assert_eq!(
            tracker.hit_all_at(&[("ping", cooldowns)], scopes(1, None), start + Duration::from_secs(5)),
            Duration::ZERO
        );
    }

    #[test]
    fn longest_scope_wins_and_blocked_hits_do_not_restamp() {
        let tracker = CooldownTracker::new();
        let cooldowns = Cooldowns {
            guild: Duration::from_secs(10),
            channel: Duration::ZERO,
            user: Duration::from_secs(2),
        };
        let start = Instant::now();

        assert_eq!(tracker.hit_all_at(&[("x", cooldowns)], scopes(1, Some(7)), start), Duration::ZERO);
        assert_eq!(
            tracker.hit_all_at(&[("x", cooldowns)], scopes(2, Some(7)), start + Duration::from_secs(1)),
            Duration::from_secs(9)
        );
        // user 2 was never stamped, so only the guild scope applies after it expires
        assert_eq!(
            tracker.hit_all_at(&[("x", cooldowns)], scopes(2, Some(7)), start + Duration::from_secs(10)),
            Duration::ZERO
        );
    }

    #[test]
    fn guild_scope_is_skipped_outside_guilds() {
        let tracker = CooldownTracker::new();
        let cooldowns = Cooldowns {
            guild: Duration::from_secs(10),
            ..Cooldowns::default()
        };
        let start = Instant::now();

        assert_eq!(tracker.hit_all_at(&[("x", cooldowns)], scopes(1, None), start), Duration::ZERO);
        assert_eq!(tracker.hit_all_at(&[("x", cooldowns)], scopes(1, None), start), Duration::ZERO);
    }

    #[test]
    fn keys_are_independent() {
        let tracker = CooldownTracker::new();
        let cooldowns = Cooldowns::user(Duration::from_secs(5));
        let start = Instant::now();

        tracker.hit_all_at(&[("a", cooldowns)], scopes(1, None), start);
        assert_eq!(tracker.hit_all_at(&[("b", cooldowns)], scopes(1, None), start), Duration::ZERO);
        assert!(Cooldowns::default().is_none());
    }

    #[test]
    fn blocked_subcommand_does_not_consume_the_command_cooldown() {
        let tracker = CooldownTracker::new();
        let short = Cooldowns::user(Duration::from_secs(1));
        let long = Cooldowns::user(Duration::from_secs(30));
        let start = Instant::now();

        tracker.hit_all_at(&[("cfg.add", long)], scopes(1, None), start);
        let entries = [("cfg", short), ("cfg.add", long)];
        assert_eq!(
            tracker.hit_all_at(&entries, scopes(1, None), start + Duration::from_secs(10)),
            Duration::from_secs(20)
        );
        assert_eq!(
            tracker.hit_all_at(&[("cfg", short)], scopes(1, None), start + Duration::from_secs(10)),
            Duration::ZERO
        );
    }
}
