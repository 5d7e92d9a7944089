//! Command definitions, checks, dispatch and application command sync.

pub mod arguments;
pub mod autocomplete;
pub mod checks;
pub mod choice;
pub mod command;
pub mod context;
pub mod error;
pub mod execution;
pub mod help;
mod localize;
pub mod option;
pub mod payload;
pub mod permissions;
pub mod registry;
pub mod sync;
mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use arguments::{ArgumentValue, InvocationPath};
pub use autocomplete::{
    AutocompleteFuture, AutocompleteItem, AutocompleteQuery, AutocompleteSource, Suggestion,
};
pub use checks::{CheckEnv, Denial, PermissionTarget};
pub use choice::ChoiceValue;
pub use command::{Aliases, Command, CommandConfig, CommandPermissions, Usage};
pub use context::{CommandContext, CommandResult, CommandSource, Invocation, Reply, RunFn};
pub use error::CommandExecutionError;
pub use execution::{dispatch_autocomplete, dispatch_prefix, dispatch_slash, run_wrapper};
pub use option::{CommandOption, OptionConfig};
pub use registry::CommandRegistry;
pub use sync::{
    ApplicationCommands, CommandScope, GlobalCommands, GuildCommands, sync_application_commands,
};
