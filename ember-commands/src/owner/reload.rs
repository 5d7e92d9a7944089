use ember_core::CommandType;
use serenity::all::CommandOptionType;
use tracing::info;

use crate::framework::help::command_name_suggestions;
use crate::framework::{
    AutocompleteSource, Command, CommandConfig, CommandContext, CommandResult, CommandScope,
    OptionConfig, Reply,
};

pub fn reload() -> Command {
    Command::new(CommandConfig {
        name: "reload".to_owned(),
        category: "owner".to_owned(),
        types: vec![CommandType::Slash, CommandType::Prefix],
        dm_permission: true,
        ephemeral_defer: true,
        beta: true,
        options: vec![OptionConfig {
            autocomplete_options: Some(AutocompleteSource::Provider(command_name_suggestions)),
            ..OptionConfig::new("command", CommandOptionType::String)
        }],
        run: Some(run),
        ..CommandConfig::default()
    })
}

fn run(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move {
        let Some(name) = ctx.str_argument("command").map(str::to_lowercase) else {
            ctx.data.i18n.load_all_locales()?;
            info!(user_id = ctx.author_id(), "translations reloaded");
            return ctx
                .reply(Reply::text(ctx.lang.t("translations")).ephemeral(true))
                .await;
        };

        let Some(command) = ctx.registry.resolve(&name) else {
            return ctx
                .reply(Reply::text(ctx.lang.t_with("notFound", &[("command", &name)])).ephemeral(true))
                .await;
        };

        let application = CommandScope::new(
            ctx.serenity.http.clone(),
            ctx.data.settings.dev_guild_id,
        );
        let reloaded = command.reload(&application, &ctx.data.i18n).await?;
        let reloaded_name = reloaded.name.clone();
        ctx.registry.replace(reloaded, &ctx.data.settings);

        info!(command = %reloaded_name, user_id = ctx.author_id(), "command reloaded");
        ctx.reply(
            Reply::text(ctx.lang.t_with("success", &[("command", &reloaded_name)])).ephemeral(true),
        )
        .await
    })
}
