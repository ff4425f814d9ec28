//! foldertidy - sort the files of a directory into category folders
//!
//! This library provides the editable extension to category table and its
//! CSV persistence, the organizer that moves the files of a directory into
//! one folder per category, an in-memory error log, and the pieces of the
//! command-line front end.

pub mod cli;
pub mod config;
pub mod error_log;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod mapping_store;
pub mod output;

pub use config::{AppConfig, ConfigError};
pub use error_log::{ErrorKind, ErrorLog, ErrorLogEntry};
pub use file_category::{ExtensionMapping, MappingEntry};
pub use file_organizer::{BatchError, OrganizeResult, OrganizerEngine};
pub use mapping_store::{MappingError, MappingStore, StoreWarning};

pub use cli::{Cli, run_cli};
