//! Daemon Core - lifecycle controller, heartbeat loop, and signal listener
//!
//! The daemon is the long-running process that:
//! - Sequences initialize, run and shutdown
//! - Runs a heartbeat loop at a fixed interval
//! - Stops gracefully on terminate-family signals

pub mod controller;
pub mod signals;
pub mod tick;

pub use controller::*;
pub use signals::*;
pub use tick::*;
