mod events;

use std::env;
use std::sync::Arc;

use serenity::all::{ClientBuilder, GatewayIntents};
use tracing::{info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use ember_commands::framework::CommandRegistry;
use ember_core::settings::env_bool;
use ember_core::{CooldownTracker, Data, I18nProvider, JsonI18n, Settings};
use ember_database::{CacheService, Database, MIGRATOR};

use crate::events::Handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN")?;
    let database_url = env::var("DATABASE_URL")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    info!("PostgreSQL connection established.");

    let redis_enabled = env_bool("REDIS_ENABLED", false);
    let redis_key_prefix =
        env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "ember:prod".to_string());

    let cache = if redis_enabled {
        match env::var("REDIS_URL") {
            Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
                Ok(cache) => {
                    info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                    cache
                }
                Err(err) => {
                    warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                    CacheService::disabled(redis_key_prefix.clone())
                }
            },
            Err(_) => {
                warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
                CacheService::disabled(redis_key_prefix.clone())
            }
        }
    } else {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        CacheService::disabled(redis_key_prefix.clone())
    };

    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will continue with fallback behavior."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    let db = Database::with_cache(db_pool, cache);

    let auto_run_migrations = env_bool("AUTO_RUN_MIGRATIONS", true);
    if auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let locales_path = env::var("LOCALES_PATH").unwrap_or_else(|_| "locales".to_string());
    let default_locale = env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string());
    let i18n: Arc<dyn I18nProvider> = Arc::new(JsonI18n::load(&locales_path, default_locale)?);
    info!(path = %locales_path, "Translations loaded.");

    let settings = Settings::from_env();
    info!(
        bot_type = ?settings.bot_type,
        prefix = %settings.prefix,
        dev_guild_id = ?settings.dev_guild_id,
        "Settings loaded."
    );

    let registry = CommandRegistry::load(ember_commands::COMMANDS, &i18n, &settings)?;
    info!(commands = registry.len(), "Command registry ready.");

    let data = Data {
        db,
        i18n,
        settings: Arc::new(settings),
        cooldowns: Arc::new(CooldownTracker::new()),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    info!("Ember is connecting...");

    let mut client = ClientBuilder::new(token, intents)
        .event_handler(Handler::new(data, registry))
        .await?;

    client.start().await?;
    Ok(())
}
