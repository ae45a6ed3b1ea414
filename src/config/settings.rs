//! Application settings and paths.
//!
//! Settings only supply CLI defaults. The scan engine never reads them; every
//! scan gets an explicit [`ScanConfig`](crate::scanner::ScanConfig).

use crate::error::{ConfigError, ConfigResult};
use crate::types::{PortError, PortSpec};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directories following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// `~/.config/nettrackr`
    pub config_dir: PathBuf,
    /// `~/.local/share/nettrackr`
    pub data_dir: PathBuf,
}

impl Paths {
    /// The process-wide paths, created on first use.
    pub fn get() -> ConfigResult<&'static Paths> {
        if let Some(paths) = PATHS.get() {
            return Ok(paths);
        }
        let paths = Self::new()?;
        Ok(PATHS.get_or_init(|| paths))
    }

    fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "xyphoscyber", "nettrackr").ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Where scan history is kept.
    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// User-tunable defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Ports scanned when none are given.
    pub default_ports: String,
    /// Per-probe timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Concurrency ceiling; a scan uses one worker per port up to this.
    pub max_concurrency: usize,
    /// Overall scan deadline in milliseconds, if any.
    pub default_deadline_ms: Option<u64>,
    /// Probes per second, 0 for unlimited.
    pub default_rate_limit: u32,
    /// Save every scan to history.
    pub auto_save_scans: bool,
    /// Log filter used when neither `RUST_LOG` nor a verbosity flag is set.
    pub log_level: String,
    /// Also write logs to a daily file under the data directory.
    pub log_file: bool,
    /// Rotated log files kept on disk.
    pub log_max_files: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: "80,443,22,21,25,53".to_string(),
            default_timeout_ms: 1000,
            max_concurrency: 500,
            default_deadline_ms: None,
            default_rate_limit: 0,
            auto_save_scans: true,
            log_level: "info".to_string(),
            log_file: true,
            log_max_files: 5,
        }
    }
}

impl AppSettings {
    /// Load from the default location. On first run the file does not exist
    /// yet; it is created with the defaults.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get()?.settings_file();
        if !file.exists() {
            let settings = Self::default();
            settings.save_to(&file)?;
            return Ok(settings);
        }
        Self::load_from(&file)
    }

    /// Load from a specific file, which must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Write to `path` as pretty JSON.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn port_spec(&self) -> Result<PortSpec, PortError> {
        self.default_ports.parse()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.default_deadline_ms.map(Duration::from_millis)
    }
}
