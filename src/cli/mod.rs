//! CLI command handling
//!
//! Dispatches CLI commands to the load and compare tools and formats output.

use std::path::Path;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::compare;
use crate::load::{self, ExecuteOptions, LoadDescriptor, RunResult, Workload};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Marker { .. } => {
            // Should never happen - marker mode is handled in main
            unreachable!("Marker command should be handled in main")
        }

        Commands::Load {
            descriptor,
            items,
            manifest,
            workload,
            workload_args,
            exe_name,
            collect_timeout,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;

            if let Some(program) = workload {
                config.workload.program = Some(program);
                config.workload.args = workload_args;
            } else if !workload_args.is_empty() {
                return Err(Error::Config(
                    "--workload-arg requires --workload".to_string(),
                ));
            }
            if exe_name.is_some() {
                config.workload.name = exe_name;
            }
            if collect_timeout.is_some() {
                config.timeouts.collect_secs = collect_timeout;
            }

            let descriptor = select_descriptor(descriptor.as_deref(), &items, &config)?;
            let workload = Workload::from_config(&config.workload)?;
            let manifest_path = manifest.unwrap_or_else(|| config.manifest.path.clone());
            let options = ExecuteOptions {
                collect_timeout: config.timeouts.collect(),
            };

            println!(
                "{} {} process(es) with {}",
                "Launching".cyan(),
                descriptor.len(),
                workload.name.white().bold()
            );

            let results = load::execute_load(&workload, &descriptor, &options).await?;
            print_results(&results);

            load::write_manifest(&results, &manifest_path)?;
            println!(
                "\nManifest written to {}",
                manifest_path.display().to_string().white().bold()
            );

            Ok(())
        }

        Commands::Compare {
            manifest,
            report,
            strict,
        } => {
            let evaluation = compare::compare_files(&manifest, &report)?;
            compare::print_evaluation(&evaluation);

            if strict && !evaluation.passed() {
                return Err(Error::ChecksFailed(evaluation.failures()));
            }
            Ok(())
        }

        Commands::Plan {
            descriptor,
            items,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let descriptor = select_descriptor(descriptor.as_deref(), &items, &config)?;
            print_plan(&descriptor)
        }
    }
}

/// Read the configuration file, from `path` when given
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

/// Descriptor file, then `--item` pairs, then the config file's load, then the reference load
fn select_descriptor(
    path: Option<&Path>,
    items: &[String],
    config: &Config,
) -> Result<LoadDescriptor> {
    if let Some(path) = path {
        return LoadDescriptor::from_file(path);
    }

    if !items.is_empty() {
        return LoadDescriptor::parse_plan(items);
    }

    if !config.load.is_empty() {
        let descriptor = LoadDescriptor::new(config.load.clone());
        descriptor.validate()?;
        return Ok(descriptor);
    }

    tracing::debug!("Using the reference load descriptor");
    Ok(LoadDescriptor::reference())
}

fn print_results(results: &[RunResult]) {
    println!("\n{}", "Results:".cyan());
    for result in results {
        let marker = if result.return_code == 0 {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} pid {} rc {} tag {} count {}",
            marker,
            result.pid,
            result.return_code,
            result.tag.dimmed(),
            result.expected_count
        );
        if !result.stderr.is_empty() {
            println!("      stderr: {}", result.stderr.dimmed());
        }
    }
}

fn print_plan(descriptor: &LoadDescriptor) -> Result<()> {
    let schedule = descriptor.schedule()?;
    println!("{}", "Load plan:".cyan());
    for (item, offset) in descriptor.items.iter().zip(schedule) {
        println!(
            "  +{:>5}s  run {:>5}s  expect {}  tag {}",
            offset.as_secs(),
            item.duration,
            item.expected_count,
            item.tag.white().bold()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_select_descriptor_precedence() {
        let config = Config::default();
        assert_eq!(
            select_descriptor(None, &[], &config).unwrap(),
            LoadDescriptor::reference()
        );

        let config = Config::parse(
            "[[load]]\npre_delay = 0\nduration = 5\nexpected_count = 1\ntag = \"0-5\"\n",
        )
        .unwrap();
        let from_config = select_descriptor(None, &[], &config).unwrap();
        assert_eq!(from_config.items[0].tag, "0-5");

        let dir = tempdir().unwrap();
        let path = dir.path().join("load.yaml");
        std::fs::write(
            &path,
            "- pre_delay: 1\n  duration: 2\n  expected_count: 1\n  tag: \"1-2\"\n",
        )
        .unwrap();
        let from_file = select_descriptor(Some(path.as_path()), &[], &config).unwrap();
        assert_eq!(from_file.items[0].tag, "1-2");

        let items = vec!["0:61".to_string(), "10:59".to_string()];
        let from_items = select_descriptor(None, &items, &config).unwrap();
        assert_eq!(from_items.items[1], load::LoadItem::new(10, 59, 1, "10-59"));
    }

    #[test]
    fn test_plan_rejects_overflowing_items() {
        let items = vec![format!("{}:1", u64::MAX), "1:1".to_string()];
        assert!(matches!(
            select_descriptor(None, &items, &Config::default()),
            Err(Error::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_invalid_config_load_rejected() {
        let config = Config::parse(
            "[[load]]\npre_delay = 0\nduration = 5\nexpected_count = 0\ntag = \"0-5\"\n",
        )
        .unwrap();
        assert!(matches!(
            select_descriptor(None, &[], &config),
            Err(Error::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempdir().unwrap();
        let path: PathBuf = dir.path().join("config.toml");
        std::fs::write(&path, "[manifest]\npath = \"m.json\"\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.manifest.path, PathBuf::from("m.json"));
    }
}
