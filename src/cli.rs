//! Command-line interface module for foldertidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument definitions
//! - Loading settings and the mapping file
//! - Organization and dry-run orchestration
//! - Mapping table edits

use crate::config::AppConfig;
use crate::error_log::{ErrorKind, ErrorLog};
use crate::file_organizer::OrganizerEngine;
use crate::mapping_store::{EditResult, MappingStore};
use crate::output::OutputFormatter;
use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "foldertidy", version, about = "Sort the files of a directory into category folders")]
pub struct Cli {
    /// Absolute path of the directory to organize. Asked for when omitted.
    pub path: Option<PathBuf>,

    /// Show where files would go without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the error log before exiting.
    #[arg(long)]
    pub show_log: bool,

    /// Settings file (TOML).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Mapping file (CSV). Overrides the settings file.
    #[arg(long, value_name = "FILE", global = true)]
    pub mapping: Option<PathBuf>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the extension mapping.
    Mappings {
        #[command(subcommand)]
        action: MappingAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum MappingAction {
    /// List all rows with their numbers.
    List,
    /// Add an extension, e.g. `add .heic Imagem`.
    Add { extension: String, category: String },
    /// Change the category of row INDEX.
    Edit { index: usize, category: String },
    /// Delete one or more rows.
    Delete {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Change the category used for unmapped extensions.
    Fallback { category: String },
    /// Replace the mapping with the default table.
    Restore,
}

/// Runs the CLI application.
///
/// Returns `Ok(false)` when something failed and was already reported to
/// the user; only unexpected errors are returned as `Err`.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use foldertidy::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["foldertidy", "/home/user/Downloads"]);
/// let ok = run_cli(cli).expect("run failed");
/// ```
pub fn run_cli(cli: Cli) -> Result<bool> {
    let config = AppConfig::load(cli.config.as_deref()).context("Error loading configuration")?;
    let mapping_path = cli.mapping.clone().unwrap_or_else(|| config.mapping_path());

    let mut log = ErrorLog::new();
    let (mut store, warning) = MappingStore::open(mapping_path, config.fallback_category.clone());
    if let Some(warning) = warning {
        OutputFormatter::warning(&warning.to_string());
        log.record_warning(&warning);
    }

    let ok = match cli.command {
        Some(Command::Mappings { action }) => run_mapping_action(&mut store, action, &mut log),
        None => {
            let directory = match cli.path {
                Some(path) => path,
                None => prompt_for_directory(&mut io::stdin().lock(), &mut io::stdout())?,
            };
            if cli.dry_run {
                dry_run(&store, directory, &mut log)
            } else {
                organize(&store, directory, &mut log)
            }
        }
    };

    if cli.show_log && !log.is_empty() {
        OutputFormatter::error_log(&log);
    }

    Ok(ok)
}

fn organize(store: &MappingStore, directory: PathBuf, log: &mut ErrorLog) -> bool {
    OutputFormatter::info(&format!("Organizing contents of: {}", directory.display()));

    let result = OrganizerEngine::organize(&directory, &store.snapshot());
    log.record_result(&result);
    OutputFormatter::organize_report(&result);

    result.overall_success
}

fn dry_run(store: &MappingStore, directory: PathBuf, log: &mut ErrorLog) -> bool {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", directory.display()));

    let plan = match OrganizerEngine::plan(&directory, store.mapping()) {
        Ok(plan) => plan,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            log.add(ErrorKind::Precondition, "Organization failed", e.to_string());
            return false;
        }
    };

    if plan.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return true;
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in &plan {
        OutputFormatter::plain(&format!(
            " - {}\n   → Would move to {}/",
            planned.file_name.to_string_lossy(),
            planned.category
        ));
        *counts.entry(planned.category.clone()).or_insert(0) += 1;
    }
    OutputFormatter::summary_table(&counts, plan.len());
    OutputFormatter::dry_run_notice("No files were modified.");
    true
}

fn run_mapping_action(store: &mut MappingStore, action: MappingAction, log: &mut ErrorLog) -> bool {
    let outcome: EditResult = match action {
        MappingAction::List => {
            OutputFormatter::mapping_table(store.mapping());
            return true;
        }
        MappingAction::Add {
            extension,
            category,
        } => store.add_entry(&extension, &category),
        MappingAction::Edit { index, category } => store.edit_entry(index, &category),
        MappingAction::Delete { indices } => store.delete_entries(&indices),
        MappingAction::Fallback { category } => store.update_fallback(&category),
        MappingAction::Restore => Ok(store.restore_defaults()),
    };

    match outcome {
        Ok(None) => {
            OutputFormatter::success("Mapping updated.");
            true
        }
        Ok(Some(warning)) => {
            OutputFormatter::warning(&format!("Mapping changed but not saved: {}", warning));
            log.record_warning(&warning);
            false
        }
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            log.record_rejection(&e);
            false
        }
    }
}

/// Asks for a directory on `output` and reads one line from `input`.
pub fn prompt_for_directory(input: &mut impl BufRead, output: &mut impl Write) -> Result<PathBuf> {
    write!(output, "Enter the directory path: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("No directory given");
    }
    let line = line.trim();
    if line.is_empty() {
        bail!("No directory given");
    }
    Ok(PathBuf::from(line))
}
