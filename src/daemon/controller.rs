//! Lifecycle Controller - owns the run flag and sequences the process phases
//!
//! Phases move strictly forward:
//!
//! ```text
//! Created --initialize--> Running --stop observed--> Stopping --shutdown--> Stopped
//! ```
//!
//! `execute` is the driver: it runs initialize, run and shutdown in order and
//! always reaches shutdown, whatever the earlier phases reported.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use super::tick::{HeartbeatLoop, HeartbeatTick, Tick};
use crate::config::ProcessSettings;
use crate::{critical, notice};

/// Shared run flag.
///
/// Starts raised and can only be lowered. Clones share the same flag, so a
/// clone handed to the signal listener stops the controller's loop.
#[derive(Debug, Clone)]
pub struct RunState {
    running: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Lower the flag. Returns true only for the call that actually lowered it.
    pub fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Failure,
}

impl ExitCode {
    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }

    /// Combine two outcomes; any failure wins
    pub fn and(self, other: ExitCode) -> ExitCode {
        if self.is_success() && other.is_success() {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }

    /// Process exit status
    pub fn code(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

/// Lifecycle phase of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Running => "running",
            Phase::Stopping => "stopping",
            Phase::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// One controller serves exactly one run of the process
pub struct Controller<T: Tick = HeartbeatTick> {
    settings: ProcessSettings,
    state: RunState,
    phase: Phase,
    heartbeat: HeartbeatLoop<T>,
}

impl Controller<HeartbeatTick> {
    /// Controller with the default heartbeat tick
    pub fn new(settings: ProcessSettings) -> Self {
        Self::with_tick(settings, HeartbeatTick)
    }
}

impl<T: Tick> Controller<T> {
    pub fn with_tick(settings: ProcessSettings, tick: T) -> Self {
        let heartbeat = HeartbeatLoop::new(settings.heartbeat_interval(), tick);
        Self {
            settings,
            state: RunState::new(),
            phase: Phase::Created,
            heartbeat,
        }
    }

    pub fn settings(&self) -> &ProcessSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handle on the run flag, for the signal listener
    pub fn run_state(&self) -> RunState {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn tick_count(&self) -> u64 {
        self.heartbeat.tick_count()
    }

    /// Ask the loop to stop; repeated calls are no-ops
    pub fn request_stop(&self) -> bool {
        let lowered = self.state.request_stop();
        if lowered {
            debug!("Stop requested");
        }
        lowered
    }

    /// Created -> Running.
    ///
    /// The flag is not raised again here: a stop requested before this call
    /// still holds, and the run phase will do zero ticks.
    pub fn initialize(&mut self) -> ExitCode {
        debug!("Initializing application");
        if self.phase != Phase::Created {
            debug!("Cannot initialize from phase {}", self.phase);
            return ExitCode::Failure;
        }
        self.phase = Phase::Running;
        ExitCode::Success
    }

    /// Run the heartbeat loop until stop is observed
    pub async fn run(&mut self) -> ExitCode {
        if self.phase != Phase::Running {
            debug!("Cannot run from phase {}", self.phase);
            return ExitCode::Failure;
        }

        debug!(
            "Running main loop, interval {} ms",
            self.heartbeat.interval().as_millis()
        );
        let performed = self.heartbeat.run(&self.state).await;
        self.phase = Phase::Stopping;
        debug!("Main loop stopped after {} ticks", performed);
        ExitCode::Success
    }

    /// Release resources and move to Stopped. A second call does nothing.
    pub fn shutdown(&mut self) -> ExitCode {
        match self.phase {
            Phase::Stopped => return ExitCode::Success,
            Phase::Created | Phase::Running => {
                self.state.request_stop();
                self.phase = Phase::Stopping;
            }
            Phase::Stopping => {}
        }

        debug!("Shutting down application main loop");
        self.phase = Phase::Stopped;
        notice!("Application runtime stopped");
        ExitCode::Success
    }

    /// Initialize, run, then always shut down. Returns the aggregated outcome.
    pub async fn execute(&mut self) -> ExitCode {
        let mut rc = self.initialize();

        if rc.is_success() {
            rc = self.run().await;
            if rc.is_success() {
                info!("Application runtime ended without errors; code {}", rc.code());
            } else {
                critical!("Application run phase failed; code {}", rc.code());
            }
        } else {
            critical!("Application initialize phase failed; code {}", rc.code());
        }

        let shutdown = self.shutdown();
        if !shutdown.is_success() {
            log::error!("Application shutdown phase failed; code {}", shutdown.code());
        }

        rc.and(shutdown)
    }
}
