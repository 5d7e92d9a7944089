/// Uppercase the first character, leave the rest untouched.
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Cut `raw` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(raw: &str, max_chars: usize) -> String {
    match raw.char_indices().nth(max_chars) {
        Some((idx, _)) => raw[..idx].to_owned(),
        None => raw.to_owned(),
    }
}

pub fn char_len(raw: &str) -> usize {
    raw.chars().count()
}

pub fn inline_code(raw: &str) -> String {
    format!("`{raw}`")
}

/// Clickable slash command mention. Falls back to plain text when the command
/// has not been registered yet.
pub fn command_mention(name: &str, command_id: Option<u64>) -> String {
    match command_id {
        Some(id) => format!("</{name}:{id}>"),
        None => format!("/{name}"),
    }
}

/// Discord relative timestamp markup, e.g. `<t:1700000000:R>`.
pub fn relative_timestamp(unix_secs: u64) -> String {
    format!("<t:{unix_secs}:R>")
}

/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h, 1d, 1h 30m).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{days}d")
        };
    }

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::{
        capitalize, char_len, command_mention, format_compact_duration, inline_code,
        truncate_chars,
    };

    #[test]
    fn capitalizes_first_letter_only() {
        assert_eq!(capitalize("slash"), "Slash");
        assert_eq!(capitalize("über"), "Über");
        assert_eq!(capitalize("aBC"), "ABC");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("äöüß", 2), "äö");
        assert_eq!(char_len("äöüß"), 4);
    }

    #[test]
    fn mentions_fall_back_without_id() {
        assert_eq!(command_mention("ping", Some(42)), "</ping:42>");
        assert_eq!(command_mention("ping", None), "/ping");
        assert_eq!(inline_code("SendMessages"), "`SendMessages`");
    }

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(0), "0s");
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3600), "1h");
        assert_eq!(format_compact_duration(3670), "1h 1m 10s");
        assert_eq!(format_compact_duration(3605), "1h 5s");
        assert_eq!(format_compact_duration(90000), "1d 1h");
    }
}
