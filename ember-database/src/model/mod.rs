pub mod command_stats;
pub mod restrictions;
