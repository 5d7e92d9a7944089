use std::fmt;

use serde::{Deserialize, Serialize};

/// How a command can be invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Slash,
    Prefix,
}

impl CommandType {
    pub const ALL: [Self; 2] = [Self::Slash, Self::Prefix];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slash => "slash",
            Self::Prefix => "prefix",
        }
    }

    pub fn capitalized(self) -> &'static str {
        match self {
            Self::Slash => "Slash",
            Self::Prefix => "Prefix",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
