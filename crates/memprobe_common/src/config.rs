//! Probe configuration file
//!
//! Config file: /etc/memprobe/config.toml, or the path given with `--config`.
//! Every section is optional; command-line flags override file values.

use crate::error::{ProbeError, Result};
use crate::meminfo::DEFAULT_MEMINFO_PATH;
use crate::threshold::{DEFAULT_CRITICAL, DEFAULT_WARNING};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default invocation deadline, matching the usual plugin convention
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Threshold ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    #[serde(default = "default_warning")]
    pub warning: String,

    #[serde(default = "default_critical")]
    pub critical: String,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            critical: default_critical(),
        }
    }
}

/// Where meminfo is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Path to the meminfo file, `-` for stdin
    #[serde(default = "default_meminfo_path")]
    pub meminfo_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            meminfo_path: default_meminfo_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Seconds before the check gives up and reports UNKNOWN
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main probe configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,
}

fn default_warning() -> String {
    DEFAULT_WARNING.to_string()
}

fn default_critical() -> String {
    DEFAULT_CRITICAL.to_string()
}

fn default_meminfo_path() -> String {
    DEFAULT_MEMINFO_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ProbeConfig {
    /// System config path: /etc/memprobe/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/memprobe/config.toml")
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path (must exist)
    /// 2. System config, if present
    /// 3. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::from_file(&system_path);
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ProbeError::config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents).map_err(|e| match e {
            ProbeError::Config(message) => {
                ProbeError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ProbeConfig =
            toml::from_str(contents).map_err(|e| ProbeError::config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.runtime.timeout_secs == 0 {
            return Err(ProbeError::config("runtime.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.thresholds.warning, "25:");
        assert_eq!(config.thresholds.critical, "10:");
        assert_eq!(config.source.meminfo_path, "/proc/meminfo");
        assert_eq!(config.runtime.timeout_secs, 15);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ProbeConfig::from_toml("[thresholds]\nwarning = \"30:\"\n").unwrap();
        assert_eq!(config.thresholds.warning, "30:");
        assert_eq!(config.thresholds.critical, "10:");
        assert_eq!(config.runtime.timeout_secs, 15);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(ProbeConfig::from_toml("").unwrap(), ProbeConfig::default());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ProbeConfig::from_toml("[runtime]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(ProbeConfig::from_toml("[history]\nkeep = true\n").is_err());
    }

    #[test]
    fn test_unknown_key_in_section_rejected() {
        let err = ProbeConfig::from_toml("[thresholds]\nwarnin = \"30:\"\n").unwrap_err();
        assert!(err.to_string().contains("warnin"), "{err}");
        assert!(ProbeConfig::from_toml("[runtime]\ntimeout = 5\n").is_err());
        assert!(ProbeConfig::from_toml("[source]\npath = \"/x\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nmeminfo_path = \"/srv/meminfo\"").unwrap();
        let config = ProbeConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.source.meminfo_path, "/srv/meminfo");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = ProbeConfig::load(Some(Path::new("/nonexistent/memprobe.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read /nonexistent/memprobe.toml"));
    }
}
