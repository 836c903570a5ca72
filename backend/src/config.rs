//! Roster configuration file support.
//!
//! Settings are read from a TOML file; every section and key is optional.
//!
//! ```toml
//! [solver]
//! fill_policy = "minimum"
//!
//! [jobs]
//! pickup_delay_ms = 800
//! completion_delay_ms = 2500
//! infeasible_on_shortfall = false
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! max_sessions = 256
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RosterError, RosterResult};
use crate::scheduler::FillPolicy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub solver: SolverSettings,
    #[serde(default)]
    pub jobs: JobSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default)]
    pub fill_policy: FillPolicy,
}

/// Generation job pacing and outcome rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    #[serde(default = "default_pickup_delay_ms")]
    pub pickup_delay_ms: u64,
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,
    /// Report a run that leaves any shift below `min_staff` as infeasible
    /// instead of completing it with gaps.
    #[serde(default)]
    pub infeasible_on_shortfall: bool,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            pickup_delay_ms: default_pickup_delay_ms(),
            completion_delay_ms: default_completion_delay_ms(),
            infeasible_on_shortfall: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Editing sessions kept open at once; the least recently used one is
    /// closed when a new session would exceed this.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_pickup_delay_ms() -> u64 {
    800
}

fn default_completion_delay_ms() -> u64 {
    2500
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_sessions() -> usize {
    256
}

impl RosterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// `RosterError::Configuration` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RosterResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RosterError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> RosterResult<Self> {
        toml::from_str(content).map_err(|e| {
            RosterError::Configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `roster.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> RosterResult<Self> {
        let search_paths = [
            PathBuf::from("roster.toml"),
            PathBuf::from("backend/roster.toml"),
            PathBuf::from("../roster.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RosterError::Configuration(
            "No roster.toml found in standard locations".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RosterConfig::from_toml_str("").unwrap();
        assert_eq!(config, RosterConfig::default());
        assert_eq!(config.solver.fill_policy, FillPolicy::Minimum);
        assert_eq!(config.jobs.pickup_delay_ms, 800);
        assert_eq!(config.jobs.completion_delay_ms, 2500);
        assert!(!config.jobs.infeasible_on_shortfall);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_sessions, 256);
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml = r#"
[solver]
fill_policy = "maximum"

[jobs]
completion_delay_ms = 10
"#;
        let config = RosterConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.solver.fill_policy, FillPolicy::Maximum);
        assert_eq!(config.jobs.completion_delay_ms, 10);
        assert_eq!(config.jobs.pickup_delay_ms, 800);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_unknown_policy_is_configuration_error() {
        let err = RosterConfig::from_toml_str("[solver]\nfill_policy = \"random\"\n").unwrap_err();
        assert!(matches!(err, RosterError::Configuration(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"\nport = 9000").unwrap();

        let config = RosterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RosterConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RosterError::Configuration(_)));
    }
}
