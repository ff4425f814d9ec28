//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the result banner of a batch, and tables for the mapping and error log.

use crate::error_log::ErrorLog;
use crate::file_category::ExtensionMapping;
use crate::file_organizer::OrganizeResult;
use colored::*;
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use foldertidy::output::OutputFormatter;
    /// OutputFormatter::success("Folder organized successfully!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints the banner for a finished batch: success, success with
    /// errors, or failure.
    pub fn organize_report(result: &OrganizeResult) {
        if !result.overall_success {
            Self::error("The folder could not be organized.");
            for error in &result.file_errors {
                eprintln!("  - {}", error);
            }
            return;
        }

        if !result.moved.is_empty() {
            Self::summary_table(&result.category_counts(), result.moved.len());
        }

        if result.file_errors.is_empty() {
            Self::success("Folder organized successfully!");
        } else {
            Self::warning(&format!(
                "Organization finished with {} {}:",
                result.file_errors.len(),
                if result.file_errors.len() == 1 { "error" } else { "errors" }
            ));
            for error in &result.file_errors {
                println!("  - {}", error);
            }
        }
    }

    /// Prints a summary table with file counts by category.
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            let file_word = if *count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word,
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_category_len
        );
    }

    /// Prints the mapping with the 1-based row numbers used by edit/delete.
    pub fn mapping_table(mapping: &ExtensionMapping) {
        Self::header("EXTENSION MAPPING");

        let width = mapping
            .entries()
            .iter()
            .map(|e| e.extension.chars().count())
            .max()
            .unwrap_or(0)
            .max(9); // "Extension"
        let index_width = mapping.len().to_string().len().max(1);

        println!(
            "{:>iw$}  {:<width$}  {}",
            "#",
            "Extension".bold(),
            "Category".bold(),
            iw = index_width,
            width = width
        );
        for (i, entry) in mapping.entries().iter().enumerate() {
            println!(
                "{:>iw$}  {:<width$}  {}",
                i + 1,
                entry.extension,
                entry.category,
                iw = index_width,
                width = width
            );
        }
        println!(
            "\nUnmapped extensions go to: {}",
            mapping.fallback_category().cyan()
        );
    }

    pub fn error_log(log: &ErrorLog) {
        Self::header("ERROR LOG");
        for entry in log.entries() {
            println!(
                "[{}] {} - {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.kind.to_string().red(),
                entry.short_message.bold()
            );
            for line in entry.detailed_message.lines() {
                println!("    {}", line);
            }
        }
    }
}
