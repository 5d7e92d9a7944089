pub mod config;
pub mod framework;
pub mod owner;
pub mod utility;

use framework::Command;

/// Constructors of every built-in command.
pub const COMMANDS: &[fn() -> Command] = &[
    utility::ping::ping,
    utility::help::help,
    utility::usage::usage,
    owner::reload::reload,
    config::restrict::restrict,
];
