use ember_core::CommandType;
use thiserror::Error;

/// A run handler, defer or denial notice failed.
#[derive(Debug, Error)]
#[error("{command_type} command \"{command}\" failed: {source}")]
pub struct CommandExecutionError {
    pub command: String,
    pub command_type: CommandType,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl CommandExecutionError {
    pub fn new(command: &str, command_type: CommandType, source: anyhow::Error) -> Self {
        Self {
            command: command.to_owned(),
            command_type,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_command_and_type() {
        let error = CommandExecutionError::new("ping", CommandType::Slash, anyhow::anyhow!("boom"));
        assert_eq!(error.to_string(), "slash command \"ping\" failed: boom");
        assert!(std::error::Error::source(&error).is_some());
    }
}
