//! Heartbeat Loop - repeats a tick at a fixed interval until stopped
//!
//! The loop checks the run flag, ticks, then sleeps for the full interval.
//! A stop request is therefore observed at most one interval late, and an
//! in-flight sleep is never cut short.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::controller::RunState;

/// One unit of scheduled work.
///
/// Ticks are expected to be short. A tick that never returns stalls shutdown.
#[async_trait]
pub trait Tick: Send {
    /// Run the tick; `count` is 1 for the first tick of the process
    async fn tick(&mut self, count: u64);
}

#[async_trait]
impl<F> Tick for F
where
    F: FnMut(u64) + Send,
{
    async fn tick(&mut self, count: u64) {
        self(count)
    }
}

/// Default tick: only reports that the loop is alive
#[derive(Debug, Default, Clone, Copy)]
pub struct HeartbeatTick;

#[async_trait]
impl Tick for HeartbeatTick {
    async fn tick(&mut self, count: u64) {
        debug!("Main loop heartbeat #{}", count);
    }
}

/// The loop itself, parameterized over the tick
pub struct HeartbeatLoop<T: Tick> {
    interval: Duration,
    tick: T,
    tick_count: u64,
}

impl<T: Tick> HeartbeatLoop<T> {
    /// Create a loop; a zero interval runs ticks back-to-back
    pub fn new(interval: Duration, tick: T) -> Self {
        Self {
            interval,
            tick,
            tick_count: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total ticks performed by this loop
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Tick until `state` reports stopped; returns the ticks done by this call
    pub async fn run(&mut self, state: &RunState) -> u64 {
        let mut performed = 0;

        while state.is_running() {
            self.tick_count += 1;
            performed += 1;
            self.tick.tick(self.tick_count).await;

            if self.interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.interval).await;
            }
        }

        performed
    }
}
