//! Workload program resolution
//!
//! The workload is the marker process the agent is expected to detect. It is
//! invoked as `<program> [args...] <duration> <tag>`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::common::config::WorkloadConfig;
use crate::common::{Error, Result};

/// Hidden subcommand that turns this binary into the marker workload
pub const MARKER_SUBCOMMAND: &str = "marker";

/// How to start one marker process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    /// Program to execute (bare names are looked up on PATH)
    pub program: PathBuf,
    /// Arguments placed before `<duration> <tag>`
    pub args: Vec<String>,
    /// Name recorded as `exe` in the manifest
    pub name: String,
}

impl Workload {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            name: name.into(),
        }
    }

    /// This binary's own `marker` subcommand
    pub fn marker() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| {
            Error::Internal(format!("Failed to get current executable path: {}", e))
        })?;
        Ok(Self::new(
            exe,
            vec![MARKER_SUBCOMMAND.to_string()],
            MARKER_SUBCOMMAND,
        ))
    }

    /// Build the workload from configuration, falling back to [`Workload::marker`]
    pub fn from_config(config: &WorkloadConfig) -> Result<Self> {
        let Some(program) = &config.program else {
            let mut workload = Self::marker()?;
            if let Some(name) = &config.name {
                workload.name = name.clone();
            }
            return Ok(workload);
        };

        let name = config
            .name
            .clone()
            .or_else(|| config.args.last().cloned())
            .unwrap_or_else(|| display_name(program));

        Ok(Self::new(program.clone(), config.args.clone(), name))
    }

    /// Resolve the program to an executable path
    ///
    /// Bare names are searched on PATH; anything containing a path separator
    /// must exist as given.
    pub fn resolve(&self) -> Result<PathBuf> {
        if is_bare_name(&self.program) {
            let name = self.program.to_string_lossy();
            return which::which(self.program.as_os_str()).map_err(|_| {
                let searched: Vec<String> = std::env::var_os("PATH")
                    .map(|p| {
                        std::env::split_paths(&p)
                            .map(|d| d.display().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                Error::workload_not_found(&name, &searched)
            });
        }

        if self.program.exists() {
            Ok(self.program.clone())
        } else {
            let shown = self.program.display().to_string();
            Err(Error::workload_not_found(&shown, &[shown.as_str()]))
        }
    }

    /// Command line for one launch, with both output streams piped
    pub(crate) fn command(&self, program: &Path, duration: u64, tag: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(&self.args)
            .arg(duration.to_string())
            .arg(tag)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

fn is_bare_name(program: &Path) -> bool {
    program.components().count() == 1 && !program.is_absolute()
}

fn display_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workload_is_marker() {
        let workload = Workload::from_config(&WorkloadConfig::default()).unwrap();
        assert_eq!(workload.args, vec!["marker".to_string()]);
        assert_eq!(workload.name, "marker");
    }

    #[test]
    fn test_script_name_becomes_exe() {
        let config = WorkloadConfig {
            program: Some(PathBuf::from("python3")),
            args: vec!["scripts/tp.py".to_string()],
            name: None,
        };
        let workload = Workload::from_config(&config).unwrap();
        assert_eq!(workload.name, "scripts/tp.py");

        let named = WorkloadConfig {
            name: Some("tp.py".to_string()),
            ..config
        };
        assert_eq!(Workload::from_config(&named).unwrap().name, "tp.py");
    }

    #[test]
    fn test_program_file_name_without_args() {
        let config = WorkloadConfig {
            program: Some(PathBuf::from("/opt/markers/tp")),
            args: vec![],
            name: None,
        };
        assert_eq!(Workload::from_config(&config).unwrap().name, "tp");
    }

    #[test]
    fn test_resolve_missing_program() {
        let workload = Workload::new("/definitely/not/here/tp", vec![], "tp");
        assert!(matches!(
            workload.resolve(),
            Err(Error::WorkloadNotFound { .. })
        ));

        let bare = Workload::new("stma-no-such-program-xyz", vec![], "x");
        assert!(matches!(bare.resolve(), Err(Error::WorkloadNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_bare_name_on_path() {
        let workload = Workload::new("sh", vec![], "sh");
        let resolved = workload.resolve().unwrap();
        assert!(resolved.is_absolute());
    }
}
