//! CLI subcommand implementations for the cardwatch binary.

pub mod commands;
pub mod doctor;
pub mod output;
