//! In-memory error log.
//!
//! Keeps every problem reported during a session (mapping file warnings,
//! refused batches, files that could not be moved) so they can be reviewed
//! after the short notification has gone. Entries are only ever appended;
//! [`ErrorLog::clear`] empties the log.

use crate::file_organizer::OrganizeResult;
use crate::mapping_store::{MappingError, StoreWarning};
use chrono::{DateTime, Local};
use std::fmt;

/// Kind of problem an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mapping file missing, corrupt or unwritable.
    Configuration,
    /// A batch was refused because of its directory path.
    Precondition,
    /// A single file could not be moved.
    File,
    /// A mapping edit was rejected.
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Configuration => "Configuration Error",
            ErrorKind::Precondition => "Critical Error",
            ErrorKind::File => "File Error",
            ErrorKind::Validation => "Validation Error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Local>,
    pub kind: ErrorKind,
    /// Notification-sized summary.
    pub short_message: String,
    /// Full description.
    pub detailed_message: String,
}

#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Vec<ErrorLogEntry>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry stamped with the current local time.
    pub fn add(
        &mut self,
        kind: ErrorKind,
        short_message: impl Into<String>,
        detailed_message: impl Into<String>,
    ) {
        self.entries.push(ErrorLogEntry {
            timestamp: Local::now(),
            kind,
            short_message: short_message.into(),
            detailed_message: detailed_message.into(),
        });
    }

    pub fn record_warning(&mut self, warning: &StoreWarning) {
        self.add(
            ErrorKind::Configuration,
            "Error loading the mapping file",
            warning.to_string(),
        );
    }

    pub fn record_rejection(&mut self, error: &MappingError) {
        self.add(ErrorKind::Validation, "Mapping change rejected", error.to_string());
    }

    /// Records the problems of a batch: one entry if it was refused,
    /// otherwise one entry per file error.
    pub fn record_result(&mut self, result: &OrganizeResult) {
        if !result.overall_success {
            let detail = result.file_errors.join("\n");
            self.add(ErrorKind::Precondition, "Organization failed", detail);
            return;
        }
        for error in &result.file_errors {
            self.add(ErrorKind::File, "Error moving file", error.clone());
        }
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
