//! Configuration and output paths

use std::path::PathBuf;

/// Name used for the project directories
const APP_NAME: &str = "stma-harness";

/// Default manifest file name, written to the working directory
pub const DEFAULT_MANIFEST: &str = "load_manifest.json";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/stma-harness/`
/// - macOS: `~/Library/Application Support/stma-harness/`
/// - Windows: `%APPDATA%\stma-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `STMA_HARNESS_CONFIG` overrides the platform location.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("STMA_HARNESS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_name() {
        assert_eq!(DEFAULT_MANIFEST, "load_manifest.json");
    }

    #[test]
    fn test_config_path_ends_with_toml() {
        if let Some(path) = config_path() {
            if std::env::var("STMA_HARNESS_CONFIG").is_err() {
                assert_eq!(path.file_name().unwrap(), "config.toml");
            }
        }
    }
}
