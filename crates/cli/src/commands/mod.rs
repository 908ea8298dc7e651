//! CLI subcommands

pub mod classify;
pub mod generate;
pub mod modes;
pub mod validate;
