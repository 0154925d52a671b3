use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fmt, fs, io};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command line arguments. Each flag can also come from the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "uptimed", version, about = "Start, stop and report on HTTP uptime monitors")]
pub struct Args {
    /// ip:port where http requests are served
    #[arg(long, env = "UPTIMED_BIND_ADDRESS")]
    pub bind_address: Option<SocketAddr>,

    /// Path to a TOML configuration file
    #[arg(long, env = "UPTIMED_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    ParseFailed { path: PathBuf, source: toml::de::Error },
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub monitor: MonitorDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind_address: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorDefaults {
    /// Deadline for each individual probe
    pub probe_timeout_secs: u64,
    /// How long shutdown waits for each running monitor's report
    pub shutdown_grace_secs: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self { bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)) }
    }
}

impl Default for MonitorDefaults {
    fn default() -> Self {
        Self { probe_timeout_secs: 10, shutdown_grace_secs: 30 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { server: Server::default(), monitor: MonitorDefaults::default() }
    }
}

impl MonitorDefaults {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &Path) -> PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().is_none_or(|ext| ext != "toml") {
        path.set_extension("toml");
    }
    path
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Configuration State:")?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind_address)?;
        write_title_1(f, "Monitor")?;
        write_1(f, "Probe Timeout (s)", &self.monitor.probe_timeout_secs)?;
        write_1(f, "Shutdown Grace (s)", &self.monitor.shutdown_grace_secs)?;

        Ok(())
    }
}

impl Config {
    /// Load the configuration file, or defaults when no file is given or it does not exist
    pub fn load(optional_path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = optional_path else {
            return Ok(Self::default());
        };

        let config_path = normalize_toml_path(path);
        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw_string = fs::read_to_string(&config_path)
            .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
        let config: Self = toml::from_str(&raw_string)
            .map_err(|source| ConfigError::ParseFailed { path: config_path, source })?;

        config.validate()?;
        Ok(config)
    }

    /// Command line flags win over the file
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(bind_address) = args.bind_address {
            self.server.bind_address = bind_address;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.probe_timeout_secs == 0 {
            return Err(ConfigError::Invalid("monitor.probe_timeout_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.monitor.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uptimed.toml");
        fs::write(&path, "[monitor]\nprobe_timeout_secs = 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.monitor.probe_timeout_secs, 3);
        assert_eq!(config.monitor.shutdown_grace_secs, 30);
        assert_eq!(config.server, Server::default());
    }

    #[test]
    fn test_path_without_extension_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("uptimed.toml"), "[server]\nbind_address = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::load(Some(&dir.path().join("uptimed"))).unwrap();
        assert_eq!(config.server.bind_address.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_invalid_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");

        fs::write(&path, "[server]\nbind_address = \"nowhere\"\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::ParseFailed { .. })));

        fs::write(&path, "[monitor]\nprobe_timeout_secs = 0\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_args_override_file() {
        let args = Args::parse_from(["uptimed", "--bind-address", "0.0.0.0:7000"]);
        let config = Config::default().with_args(&args);
        assert_eq!(config.server.bind_address.to_string(), "0.0.0.0:7000");

        let unchanged = Config::default().with_args(&Args::default());
        assert_eq!(unchanged, Config::default());
    }

    #[test]
    fn test_display_lists_every_setting() {
        let rendered = Config::default().to_string();
        assert!(rendered.contains("Bind Address: 127.0.0.1:8080"));
        assert!(rendered.contains("Probe Timeout (s): 10"));
        assert!(rendered.contains("Shutdown Grace (s): 30"));
    }
}
