/// A message split into the invoked command name and its whitespace-separated arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixInvocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `content` as a prefix command. Accepts the configured prefix or a
/// leading bot mention (`<@id>` / `<@!id>`) when `bot_id` is given.
pub fn parse_prefix_invocation(
    content: &str,
    prefix: &str,
    bot_id: Option<u64>,
) -> Option<PrefixInvocation> {
    let trimmed = content.trim_start();
    let rest = strip_mention(trimmed, bot_id)
        .or_else(|| (!prefix.is_empty()).then(|| trimmed.strip_prefix(prefix)).flatten())?;

    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_lowercase();

    Some(PrefixInvocation {
        name,
        args: parts.map(str::to_owned).collect(),
    })
}

fn strip_mention(content: &str, bot_id: Option<u64>) -> Option<&str> {
    let bot_id = bot_id?;
    [format!("<@{bot_id}>"), format!("<@!{bot_id}>")]
        .iter()
        .find_map(|mention| content.strip_prefix(mention.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_messages() {
        let parsed = parse_prefix_invocation("!Help  utility extra", "!", None).unwrap();
        assert_eq!(parsed.name, "help");
        assert_eq!(parsed.args, vec!["utility", "extra"]);
    }

    #[test]
    fn parses_mention_prefix() {
        let parsed = parse_prefix_invocation("<@!42> ping", "!", Some(42)).unwrap();
        assert_eq!(parsed.name, "ping");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn rejects_unprefixed_or_empty() {
        assert_eq!(parse_prefix_invocation("hello", "!", Some(42)), None);
        assert_eq!(parse_prefix_invocation("!", "!", None), None);
        assert_eq!(parse_prefix_invocation("<@43> ping", "!", Some(42)), None);
    }
}
