pub mod config;
pub mod rule;
