//! Parser module for the sluice command-line grammar

pub mod command_line;

pub use command_line::*;
