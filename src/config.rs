//! Process settings loaded once at startup from a JSON file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{HeartbeatError, Result};
use crate::logging::LogLevel;

/// Smallest accepted config file, in bytes (`{}`)
pub const MIN_CONFIG_SIZE: u64 = 2;

/// Largest accepted config file, in bytes
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Settings record. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcessSettings {
    #[serde(rename = "LogLevel")]
    log_level: LogLevel,
    #[serde(rename = "MainLoopTimeout")]
    heartbeat_interval_ms: u64,
}

impl ProcessSettings {
    pub fn new(log_level: LogLevel, heartbeat_interval_ms: u64) -> Self {
        Self {
            log_level,
            heartbeat_interval_ms,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn heartbeat_interval_ms(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Pause between two heartbeat ticks
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Validate the file, then parse it.
    ///
    /// Metadata is checked before the file is opened: it must be a regular
    /// file, `MIN_CONFIG_SIZE..=MAX_CONFIG_SIZE` bytes long, and readable by
    /// its owner.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(HeartbeatError::EmptyConfigPath);
        }

        debug!("Checking config file {}", path.display());
        check_metadata(path)?;

        debug!("Reading config file {}", path.display());
        let content = fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;

        settings.print();
        debug!("Config file {} was loaded", path.display());
        Ok(settings)
    }

    /// Parse settings from JSON text; both keys are required
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    fn print(&self) {
        info!("<<< Current configuration >>>");
        info!("LogLevel: {}", self.log_level);
        info!("MainLoopTimeout: {} ms", self.heartbeat_interval_ms);
    }
}

fn check_metadata(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HeartbeatError::ConfigNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(HeartbeatError::NotRegularFile(path.to_path_buf()));
    }

    let size = metadata.len();
    if !(MIN_CONFIG_SIZE..=MAX_CONFIG_SIZE).contains(&size) {
        return Err(HeartbeatError::ConfigSize {
            path: path.to_path_buf(),
            size,
            min: MIN_CONFIG_SIZE,
            max: MAX_CONFIG_SIZE,
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o400 == 0 {
            return Err(HeartbeatError::NotReadable(path.to_path_buf()));
        }
    }

    Ok(())
}
