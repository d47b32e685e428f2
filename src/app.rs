//! Command-line definitions and logging setup for the binary.

pub mod cli;
pub mod logging;
