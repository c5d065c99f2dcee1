//! Runtime settings read from the environment (and a `.env` file, if present).
//!
//! | Variable              | Default                      |
//! |-----------------------|------------------------------|
//! | `LOG_FILE_PATH`       | `logs/cycling_portal.log`    |
//! | `CYCLING_PORTAL_FILE` | `cycling_portal.json`        |
//! | `RUST_LOG`            | `info` (stderr)              |
//! | `RUST_LOG_JSON`       | `debug` (JSON log file)      |

use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/cycling_portal.log";
pub const DEFAULT_PORTAL_FILE: &str = "cycling_portal.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub log_file_path: PathBuf,
    /// Save file used when a command is not given `--file`.
    pub portal_file: PathBuf,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE_PATH),
            portal_file: PathBuf::from(DEFAULT_PORTAL_FILE),
        }
    }
}

impl PortalConfig {
    /// Loads `.env` and reads the variables above. Unset or empty variables
    /// fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        Self {
            log_file_path: read("LOG_FILE_PATH", DEFAULT_LOG_FILE_PATH),
            portal_file: read("CYCLING_PORTAL_FILE", DEFAULT_PORTAL_FILE),
        }
    }

    /// Directory and file name for the rolling log appender.
    pub fn log_location(&self) -> (&Path, &std::ffi::OsStr) {
        let dir = self
            .log_file_path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(Path::new("logs"));
        let name = self
            .log_file_path
            .file_name()
            .unwrap_or(std::ffi::OsStr::new("cycling_portal.log"));
        (dir, name)
    }
}
