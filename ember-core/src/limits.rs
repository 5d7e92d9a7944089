//! Discord's application command limits.

pub const AUTOCOMPLETE_OPTIONS_MAX_AMOUNT: usize = 25;
pub const CHOICE_NAME_MAX_LENGTH: usize = 100;
pub const CHOICE_NAME_MIN_LENGTH: usize = 2;
pub const CHOICES_MAX_AMOUNT: usize = 25;
pub const DESCRIPTION_MAX_LENGTH: usize = 100;
pub const NAME_MAX_LENGTH: usize = 32;
