use thiserror::Error;

/// A command or option definition that cannot be fixed up automatically.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Number and Integer options do not support \"min_length\" and \"max_length\" ({id})")]
    LengthOnNumeric { id: String },

    #[error("String options do not support \"min_value\" and \"max_value\" ({id})")]
    ValueOnString { id: String },

    #[error("Too many choices ({count}) found for option \"{name}\" ({id}). Max is {max}.")]
    TooManyChoices {
        id: String,
        name: String,
        count: usize,
        max: usize,
    },

    #[error("Option \"{id}\" cannot use choices and autocomplete at the same time")]
    ChoicesWithAutocomplete { id: String },

    #[error("Missing \"{locale}\" translation for \"{key}\"")]
    MissingTranslation { locale: String, key: String },

    #[error("Command \"{id}\" has no run handler")]
    MissingRunHandler { id: String },

    #[error("Command \"{id}\" does not declare any command type")]
    NoCommandTypes { id: String },

    #[error("Invalid name \"{name}\" ({id}): {reason}")]
    InvalidName {
        id: String,
        name: String,
        reason: &'static str,
    },
}
