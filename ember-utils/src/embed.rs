use serenity::all::{CreateEmbed, CreateEmbedFooter};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_55_30;

/// Color of denial and failure notices.
pub const ERROR_EMBED_COLOR: u32 = 0xED_42_45;

pub fn error_embed(description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .color(ERROR_EMBED_COLOR)
        .description(description)
}

pub fn titled_error_embed(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    error_embed(description).title(title)
}

/// Standard informational embed with an optional footer.
pub fn info_embed(
    title: impl Into<String>,
    description: impl Into<String>,
    footer: Option<&str>,
) -> CreateEmbed {
    let builder = CreateEmbed::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    match footer {
        Some(text) if !text.is_empty() => builder.footer(CreateEmbedFooter::new(text)),
        _ => builder,
    }
}
