use ember_core::{CommandType, Translator};
use ember_database::impls::command_stats::command_stats;
use ember_database::model::command_stats::CommandStats;
use ember_utils::embed::{error_embed, info_embed};
use ember_utils::formatting::relative_timestamp;
use serenity::all::{CommandOptionType, CreateEmbed};
use tracing::warn;

use crate::framework::help::command_name_suggestions;
use crate::framework::{
    AutocompleteSource, Command, CommandConfig, CommandContext, CommandResult, OptionConfig,
    Reply, Usage,
};

pub fn usage() -> Command {
    Command::new(CommandConfig {
        name: "usage".to_owned(),
        category: "utility".to_owned(),
        types: vec![CommandType::Slash, CommandType::Prefix],
        dm_permission: true,
        ephemeral_defer: true,
        beta: true,
        options: vec![OptionConfig {
            strict_autocomplete: true,
            autocomplete_options: Some(AutocompleteSource::Provider(command_name_suggestions)),
            ..OptionConfig::new("command", CommandOptionType::String)
        }],
        run: Some(run),
        ..CommandConfig::default()
    })
}

fn run(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move {
        let name = ctx
            .str_argument("command")
            .map(str::to_lowercase)
            .unwrap_or_else(|| ctx.command.original_name().to_owned());

        let embed = match ctx.registry.resolve(&name) {
            Some(command) if !command.disabled => {
                let usage = command
                    .usage_for(ctx.lang.locale())
                    .with_prefix(&ctx.data.settings.prefix);
                let stats = match command_stats(&ctx.data.db, &command.name).await {
                    Ok(stats) => stats_text(&stats, &ctx.lang),
                    Err(error) => {
                        warn!(?error, command = %command.name, "failed to load command stats");
                        None
                    }
                };
                usage_embed(&ctx, &command.name, &usage, stats)
            }
            _ => error_embed(ctx.lang.t_with("notFound", &[("command", &name)])),
        };

        ctx.reply(Reply::embed(embed).ephemeral(true)).await
    })
}

fn usage_text(usage: &Usage, no_info: &str, examples_label: &str) -> String {
    let mut text = usage.usage.clone().unwrap_or_else(|| no_info.to_owned());
    if let Some(examples) = &usage.examples {
        text.push_str(&format!("\n\n**{examples_label}**\n{examples}"));
    }
    text
}

/// How often the command ran since its first recorded use. `None` before
/// the first use.
fn stats_text(stats: &CommandStats, lang: &Translator) -> Option<String> {
    let since = relative_timestamp(stats.created_at?);
    let uses = stats.total_uses().to_string();
    Some(lang.t_with("stats", &[("uses", &uses), ("since", &since)]))
}

fn usage_embed(
    ctx: &CommandContext<'_>,
    name: &str,
    usage: &Usage,
    stats: Option<String>,
) -> CreateEmbed {
    let mut description = usage_text(
        usage,
        &ctx.lang.t("others.getCommands.noInfo"),
        &ctx.lang.t("examples"),
    );
    if let Some(stats) = stats {
        description.push_str("\n\n");
        description.push_str(&stats);
    }

    info_embed(
        ctx.lang.t_with("embedTitle", &[("command", name)]),
        description,
        None,
    )
}
