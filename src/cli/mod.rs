//! CLI module for heartbeatd - command-line interface.
//!
//! The process takes exactly one positional argument, the settings file.

pub mod commands;

pub use commands::Cli;
