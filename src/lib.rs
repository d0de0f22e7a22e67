//! heartbeatd - a minimal long-running process skeleton
//!
//! Loads a JSON settings file, levels the logger, arms a signal listener and
//! runs a heartbeat loop until a terminate-family signal arrives.

pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;

pub use error::{HeartbeatError, Result};
