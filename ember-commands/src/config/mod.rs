pub mod restrict;
