pub mod command_type;
pub mod cooldowns;
pub mod error;
pub mod i18n;
pub mod limits;
pub mod settings;

use std::sync::Arc;

use ember_database::Database;

pub use command_type::CommandType;
pub use cooldowns::{CooldownScopes, CooldownTracker, Cooldowns};
pub use error::DefinitionError;
pub use i18n::{I18nProvider, JsonI18n, Translator};
pub use settings::{BotType, Settings};

pub type Error = anyhow::Error;

/// Runtime state every command invocation can reach.
#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub i18n: Arc<dyn I18nProvider>,
    pub settings: Arc<Settings>,
    pub cooldowns: Arc<CooldownTracker>,
}
