//! Signal Listener - turns terminate-family OS signals into a stop request
//!
//! A dedicated thread blocks on the next signal from a fixed observed set and
//! classifies it by table lookup:
//! - SIGINT, SIGTERM, SIGQUIT, SIGHUP request a stop
//! - every other observed signal is logged and ignored
//! - numbers without a known name are logged as a warning and ignored

use std::ffi::c_int;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use signal_hook::consts::signal::*;
use signal_hook::iterator::{Handle, Signals};
use signal_hook::low_level::signal_name;

use super::controller::RunState;
use crate::error::{HeartbeatError, Result};

/// Signals that begin a graceful shutdown
pub const TERMINATE_SIGNALS: [c_int; 4] = [SIGINT, SIGTERM, SIGQUIT, SIGHUP];

/// Signals observed only for logging.
///
/// SIGPIPE stays out: the listener's own wakeup pipe raises it once the
/// reading side is gone.
pub const OBSERVED_SIGNALS: [c_int; 11] = [
    SIGUSR1, SIGUSR2, SIGALRM, SIGCHLD, SIGCONT, SIGURG, SIGWINCH, SIGVTALRM, SIGPROF, SIGXCPU,
    SIGXFSZ,
];

/// What the listener does with a received signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Stop,
    Ignore,
}

/// Table lookup from signal number to action
pub fn classify(signum: c_int) -> SignalAction {
    if TERMINATE_SIGNALS.contains(&signum) {
        SignalAction::Stop
    } else {
        SignalAction::Ignore
    }
}

/// Log and act on one received signal
pub fn dispatch(signum: c_int, state: &RunState) -> SignalAction {
    let Some(name) = signal_name(signum) else {
        warn!("Received signal is unknown; signum = {}", signum);
        return SignalAction::Ignore;
    };

    debug!("Received '{}' signal; signum = {}", name, signum);

    let action = classify(signum);
    if action == SignalAction::Stop {
        if state.request_stop() {
            info!("Stop requested by {}", name);
        } else {
            debug!("Stop already requested, ignoring {}", name);
        }
    }
    action
}

/// Background observer bound to one run flag
pub struct SignalListener {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Register handlers and start the listener thread
    pub fn spawn(state: RunState) -> Result<Self> {
        debug!("Setting up signal handling");

        let mut signals = Signals::new(TERMINATE_SIGNALS.iter().chain(OBSERVED_SIGNALS.iter()))
            .map_err(|e| HeartbeatError::Signal(format!("failed to register handlers: {}", e)))?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signal-listener".to_string())
            .spawn(move || {
                for signum in signals.forever() {
                    dispatch(signum, &state);
                }
                debug!("Signal listener closed");
            })?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// Unregister handlers and wait for the listener thread to exit
    pub fn close(mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Signal listener thread panicked");
            }
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        // Already closed and joined by `close`
        if self.thread.is_some() && !self.handle.is_closed() {
            self.handle.close();
        }
    }
}
