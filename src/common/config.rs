//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{config_path, DEFAULT_MANIFEST};
use super::Result;
use crate::load::LoadItem;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Workload program settings
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Manifest output settings
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Load descriptor; the built-in reference load is used when empty
    #[serde(default)]
    pub load: Vec<LoadItem>,
}

/// Configuration for the workload program
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WorkloadConfig {
    /// Program to launch; defaults to this binary's `marker` subcommand
    pub program: Option<PathBuf>,

    /// Arguments placed before `<duration> <tag>`
    #[serde(default)]
    pub args: Vec<String>,

    /// Name recorded as `exe` in the manifest
    pub name: Option<String>,
}

/// Manifest output settings
#[derive(Debug, Deserialize)]
pub struct ManifestConfig {
    /// Where the manifest is written
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
        }
    }
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST)
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Default)]
pub struct Timeouts {
    /// Per-process wait limit during collection; unset waits forever
    pub collect_secs: Option<u64>,
}

impl Timeouts {
    pub fn collect(&self) -> Option<Duration> {
        self.collect_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.workload.program.is_none());
        assert!(config.workload.args.is_empty());
        assert_eq!(config.manifest.path, PathBuf::from("load_manifest.json"));
        assert!(config.timeouts.collect().is_none());
        assert!(config.load.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
[workload]
program = "python3"
args = ["tp.py"]
name = "tp.py"

[manifest]
path = "out/manifest.json"

[timeouts]
collect_secs = 600

[[load]]
pre_delay = 0
duration = 61
expected_count = 2
tag = "0-61"

[[load]]
pre_delay = 10
duration = 59
expected_count = 1
tag = "10-59"
"#,
        )
        .unwrap();

        assert_eq!(config.workload.program, Some(PathBuf::from("python3")));
        assert_eq!(config.workload.args, vec!["tp.py".to_string()]);
        assert_eq!(config.workload.name.as_deref(), Some("tp.py"));
        assert_eq!(config.manifest.path, PathBuf::from("out/manifest.json"));
        assert_eq!(config.timeouts.collect(), Some(Duration::from_secs(600)));
        assert_eq!(config.load.len(), 2);
        assert_eq!(config.load[1].tag, "10-59");
        assert_eq!(config.load[0].expected_count, 2);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let err = Config::parse("[timeouts]\ncollect_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, super::super::Error::ConfigParse(_)));
    }
}
