/// Embed builders shared by the framework and built-in commands.
pub mod embed;
/// Shared formatting helpers (capitalization, truncation, mentions, durations).
pub mod formatting;
/// Prefix-command message parsing.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
