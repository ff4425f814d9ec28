/// File organization engine for moving files into category directories.
///
/// One call to [`OrganizerEngine::organize`] is a batch: the direct regular
/// files of a directory are classified by suffix and moved, one at a time,
/// into `<directory>/<category>/`. Problems with a single file are recorded
/// and the batch carries on; only a bad directory path stops it, and it does
/// so before any file is touched.
use crate::file_category::{ExtensionMapping, file_suffix};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reasons a whole batch is refused.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("The path {} is not absolute", .0.display())]
    NotAbsolute(PathBuf),

    #[error("The directory {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("The path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Could not read directory {}: {source}", .path.display())]
    Enumerate { path: PathBuf, source: io::Error },
}

/// Problems with a single file. The batch continues past these.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(
        "Failed to create directory {} for {}: {source}",
        .path.display(),
        .source_path.display()
    )]
    CreateCategoryDir {
        path: PathBuf,
        source_path: PathBuf,
        source: io::Error,
    },

    #[error("Permission denied moving {}", .source_path.display())]
    PermissionDenied { source_path: PathBuf },

    #[error("Failed to move {} to {}: {source}", .source_path.display(), .destination.display())]
    Move {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
}

/// A file the organizer would move, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Current location of the file.
    pub source: PathBuf,
    /// Original file name.
    pub file_name: OsString,
    /// Category folder the file belongs in.
    pub category: String,
}

/// A file that was moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct OrganizeResult {
    /// False only when the batch was refused before touching any file.
    pub overall_success: bool,
    /// One description per file that could not be moved, or the single
    /// reason the batch was refused.
    pub file_errors: Vec<String>,
    /// Files that were moved, in processing order.
    pub moved: Vec<MovedFile>,
    /// Set when the batch was refused.
    pub batch_error: Option<BatchError>,
}

impl OrganizeResult {
    fn refused(error: BatchError) -> Self {
        Self {
            overall_success: false,
            file_errors: vec![error.to_string()],
            moved: Vec::new(),
            batch_error: Some(error),
        }
    }

    /// True if the batch ran and every file was moved.
    pub fn is_clean(&self) -> bool {
        self.overall_success && self.file_errors.is_empty()
    }

    /// Number of moved files per category, sorted by category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for moved in &self.moved {
            *counts.entry(moved.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Classifies and moves the files of a directory.
pub struct OrganizerEngine;

impl OrganizerEngine {
    /// Lists the direct regular files of `directory` with their categories,
    /// without moving anything.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] if the path is relative, missing, not a
    /// directory, or cannot be listed.
    pub fn plan(
        directory: &Path,
        mapping: &ExtensionMapping,
    ) -> Result<Vec<PlannedMove>, BatchError> {
        let files = Self::regular_files(directory)?;

        Ok(files
            .into_iter()
            .map(|source| {
                let file_name = source.file_name().map(OsString::from).unwrap_or_default();
                let name = file_name.to_string_lossy();
                let category = mapping.categorize(file_suffix(&name)).to_string();
                debug!(file = %name, %category, "classified");
                PlannedMove {
                    source,
                    file_name,
                    category,
                }
            })
            .collect())
    }

    /// Organizes `directory` using `mapping`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldertidy::file_category::ExtensionMapping;
    /// use foldertidy::file_organizer::OrganizerEngine;
    /// use std::path::Path;
    ///
    /// let result = OrganizerEngine::organize(Path::new("/home/user/Downloads"), &ExtensionMapping::default());
    /// if !result.overall_success {
    ///     eprintln!("Organization failed: {}", result.file_errors[0]);
    /// } else {
    ///     println!("{} moved, {} errors", result.moved.len(), result.file_errors.len());
    /// }
    /// ```
    pub fn organize(directory: &Path, mapping: &ExtensionMapping) -> OrganizeResult {
        let plan = match Self::plan(directory, mapping) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "organize refused");
                return OrganizeResult::refused(e);
            }
        };

        let mut result = OrganizeResult {
            overall_success: true,
            ..Default::default()
        };

        for planned in plan {
            match Self::move_to_category(directory, &planned) {
                Ok(moved) => {
                    info!(
                        source = %moved.source.display(),
                        destination = %moved.destination.display(),
                        "moved"
                    );
                    result.moved.push(moved);
                }
                Err(e) => {
                    warn!(error = %e, "could not organize file");
                    result.file_errors.push(e.to_string());
                }
            }
        }

        result
    }

    /// Checks the batch preconditions and lists regular files in name order.
    fn regular_files(directory: &Path) -> Result<Vec<PathBuf>, BatchError> {
        if !directory.is_absolute() {
            return Err(BatchError::NotAbsolute(directory.to_path_buf()));
        }

        let metadata = fs::metadata(directory).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BatchError::NotFound(directory.to_path_buf()),
            _ => BatchError::Enumerate {
                path: directory.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(BatchError::NotADirectory(directory.to_path_buf()));
        }

        let enumerate_error = |source| BatchError::Enumerate {
            path: directory.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(directory).map_err(enumerate_error)? {
            let entry = entry.map_err(enumerate_error)?;
            // DirEntry::file_type does not follow symlinks.
            if entry.file_type().map_err(enumerate_error)?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Moves one file into its category directory, renaming on collision.
    fn move_to_category(base_path: &Path, planned: &PlannedMove) -> Result<MovedFile, FileError> {
        let category_path = base_path.join(&planned.category);

        fs::create_dir_all(&category_path).map_err(|e| FileError::CreateCategoryDir {
            path: category_path.clone(),
            source_path: planned.source.clone(),
            source: e,
        })?;

        let destination = unique_destination(&category_path, &planned.file_name);

        fs::rename(&planned.source, &destination).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied {
                source_path: planned.source.clone(),
            },
            _ => FileError::Move {
                source_path: planned.source.clone(),
                destination: destination.clone(),
                source: e,
            },
        })?;

        Ok(MovedFile {
            source: planned.source.clone(),
            destination,
            category: planned.category.clone(),
        })
    }
}

/// Returns `folder/file_name`, or the first free `stem(n)suffix` in `folder`.
///
/// Only `folder` is inspected.
///
/// ```no_run
/// use foldertidy::file_organizer::unique_destination;
/// use std::ffi::OsStr;
/// use std::path::Path;
///
/// // With Texto/a.txt already present:
/// let path = unique_destination(Path::new("/tmp/in/Texto"), OsStr::new("a.txt"));
/// assert_eq!(path, Path::new("/tmp/in/Texto/a(1).txt"));
/// ```
pub fn unique_destination(folder: &Path, file_name: &OsStr) -> PathBuf {
    let candidate = folder.join(file_name);
    if !occupied(&candidate) {
        return candidate;
    }

    let (stem, extension) = split_file_name(file_name);
    let mut counter: u64 = 1;
    loop {
        let mut numbered = stem.to_os_string();
        numbered.push(format!("({})", counter));
        if let Some(extension) = extension {
            numbered.push(".");
            numbered.push(extension);
        }

        let candidate = folder.join(numbered);
        if !occupied(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits a file name into stem and extension without decoding it.
///
/// Matches [`file_suffix`]: a leading dot or a trailing dot does not start
/// an extension.
fn split_file_name(file_name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(extension)) if !extension.is_empty() => (stem, Some(extension)),
        _ => (file_name, None),
    }
}

/// True for anything at `path`, including dangling symlinks.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
