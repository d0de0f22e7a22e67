//! Signal listener integration tests
//!
//! Signals are process-wide, so everything that raises a real signal lives in
//! a single test to keep listeners from observing each other's signals.

use std::thread;
use std::time::{Duration, Instant};

use heartbeatd::daemon::{RunState, SignalListener};
use signal_hook::consts::signal::{SIGINT, SIGTERM, SIGUSR1, SIGWINCH};
use signal_hook::low_level::raise;

fn wait_until_stopped(state: &RunState, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !state.is_running() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    !state.is_running()
}

/// Integration test: ignored signals keep running, terminate signals stop once
#[test]
fn test_listener_translates_terminate_signals() {
    let state = RunState::new();
    let listener = SignalListener::spawn(state.clone()).unwrap();

    raise(SIGUSR1).unwrap();
    raise(SIGWINCH).unwrap();
    thread::sleep(Duration::from_millis(100));
    assert!(state.is_running());

    raise(SIGTERM).unwrap();
    assert!(wait_until_stopped(&state, Duration::from_secs(2)));

    // Repeated terminate signals are harmless
    raise(SIGINT).unwrap();
    raise(SIGTERM).unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(!state.is_running());

    listener.close();
}
