use std::time::{Duration, Instant};

use ember_core::{CommandType, Cooldowns};

use crate::framework::{Command, CommandConfig, CommandContext, CommandResult};

pub fn ping() -> Command {
    Command::new(CommandConfig {
        name: "ping".to_owned(),
        category: "utility".to_owned(),
        types: vec![CommandType::Slash, CommandType::Prefix],
        cooldowns: Cooldowns::user(Duration::from_secs(1)),
        dm_permission: true,
        no_defer: true,
        beta: true,
        run: Some(run),
        ..CommandConfig::default()
    })
}

fn run(ctx: CommandContext<'_>) -> CommandResult<'_> {
    Box::pin(async move {
        let started = Instant::now();
        ctx.say(ctx.lang.t("pinging")).await?;

        let elapsed = started.elapsed().as_millis().to_string();
        ctx.say(ctx.lang.t_with("response", &[("ms", &elapsed)]))
            .await?;
        Ok(())
    })
}
