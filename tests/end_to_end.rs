//! End-to-end tests against the built binary

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("heartbeatd.json");
    std::fs::write(&path, content).unwrap();
    path
}

fn spawn(config: &Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_heartbeatd"))
        .arg(config)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

fn send_signal(child: &Child, signum: libc::c_int) {
    let pid = libc::pid_t::try_from(child.id()).unwrap();
    // SAFETY: kill only takes plain integers; the pid belongs to our own child
    let rc = unsafe { libc::kill(pid, signum) };
    assert_eq!(rc, 0, "kill({}, {}) failed", pid, signum);
}

/// Start a daemon, let it tick, deliver `signum`, and return the exit status,
/// the time from signal to exit, and the captured log
fn stop_with(signum: libc::c_int, interval_ms: u64) -> (ExitStatus, Duration, String) {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!(r#"{{"LogLevel":6,"MainLoopTimeout":{}}}"#, interval_ms),
    );
    let mut child = spawn(&config);

    thread::sleep(Duration::from_millis(350));
    assert!(child.try_wait().unwrap().is_none());

    send_signal(&child, signum);
    let signalled = Instant::now();
    let status =
        wait_with_timeout(&mut child, Duration::from_secs(5)).expect("daemon did not exit");
    let latency = signalled.elapsed();

    (status, latency, stderr_of(&mut child))
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

fn stderr_of(child: &mut Child) -> String {
    let mut output = String::new();
    child.stderr.take().unwrap().read_to_string(&mut output).unwrap();
    output
}

fn run_to_completion(args: &[&Path]) -> (ExitStatus, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_heartbeatd"))
        .args(args)
        .output()
        .unwrap();
    (output.status, String::from_utf8_lossy(&output.stderr).into_owned())
}

/// End-to-end: SIGINT stops a running daemon within about one interval
#[test]
fn test_interrupt_stops_heartbeat() {
    let (status, latency, log) = stop_with(SIGINT, 100);

    assert_eq!(status.code(), Some(0));
    assert!(latency < Duration::from_millis(300), "exit took {:?}", latency);

    let heartbeats = log
        .lines()
        .filter(|line| line.contains("Main loop heartbeat"))
        .count();
    assert!(heartbeats >= 3, "only {} heartbeats logged:\n{}", heartbeats, log);
    assert!(log.contains("Application runtime stopped"));
    assert!(log.contains("Signal listener closed"));
}

/// End-to-end: every terminate-family signal ends the process after the listener closes
#[test]
fn test_terminate_family_exits_after_listener_close() {
    for signum in [SIGTERM, SIGQUIT, SIGHUP] {
        let (status, latency, log) = stop_with(signum, 50);

        assert_eq!(status.code(), Some(0), "signal {}:\n{}", signum, log);
        assert!(latency < Duration::from_millis(250), "exit took {:?}", latency);
        assert!(log.contains("Signal listener closed"));
    }
}

/// End-to-end: non-terminating signals are logged and ignored
#[test]
fn test_user_signal_does_not_stop() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{"LogLevel":6,"MainLoopTimeout":20}"#);
    let mut child = spawn(&config);

    thread::sleep(Duration::from_millis(200));
    send_signal(&child, SIGUSR1);
    thread::sleep(Duration::from_millis(150));
    assert!(child.try_wait().unwrap().is_none());

    send_signal(&child, SIGTERM);
    let status =
        wait_with_timeout(&mut child, Duration::from_secs(5)).expect("daemon did not exit");
    assert_eq!(status.code(), Some(0));

    let log = stderr_of(&mut child);
    assert!(log.contains("'SIGUSR1'"));
    assert!(log.contains("Stop requested by SIGTERM"));
}

/// End-to-end: bad configs fail before any lifecycle phase
#[test]
fn test_config_rejections_fail_fast() {
    let dir = TempDir::new().unwrap();
    let cases = [
        dir.path().join("missing.json"),
        write_config(&dir, "{}"),
    ];

    for config in &cases {
        let (status, log) = run_to_completion(&[config.as_path()]);
        assert_eq!(status.code(), Some(1), "config {}", config.display());
        assert!(log.contains("CRITICAL"));
        assert!(!log.contains("Initializing application"));
    }

    let tiny = dir.path().join("tiny.json");
    std::fs::write(&tiny, "{").unwrap();
    let (status, log) = run_to_completion(&[tiny.as_path()]);
    assert_eq!(status.code(), Some(1));
    assert!(log.contains("outside 2..=1048576"));
}

/// End-to-end: argument errors exit before anything else runs
#[test]
fn test_argument_errors() {
    let (status, _) = run_to_completion(&[]);
    assert_eq!(status.code(), Some(2));

    let (status, _) = run_to_completion(&[Path::new("a.json"), Path::new("b.json")]);
    assert_eq!(status.code(), Some(2));
}
