//! Persisted extension to category table.
//!
//! The table lives in a CSV file with a `File extension,File Type` header.
//! Every mutation rewrites the whole file immediately. Storage problems never
//! make the table unusable: a missing or corrupt file is replaced by the
//! default table and the problem is reported as a [`StoreWarning`].

use crate::file_category::{ExtensionMapping, MappingEntry};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Header of the first CSV column.
pub const EXTENSION_FIELDNAME: &str = "File extension";
/// Header of the second CSV column.
pub const CATEGORY_FIELDNAME: &str = "File Type";

/// Non-fatal storage problems. The in-memory table stays usable.
#[derive(Debug, Error)]
pub enum StoreWarning {
    #[error("could not create mapping file {}: {source}; using the default table", .path.display())]
    CreateFailed { path: PathBuf, source: io::Error },

    #[error("mapping file {} could not be read ({reason}); it was reset to the default table", .path.display())]
    Reseeded { path: PathBuf, reason: String },

    #[error("could not write mapping file {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },
}

/// Rejected mapping edits. The table is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("extension '{0}' already exists")]
    DuplicateExtension(String),

    #[error("extension must not be empty")]
    EmptyExtension,

    #[error("category must not be empty")]
    EmptyCategory,

    #[error("row {index} is out of range (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result of a mapping edit: `Ok(Some(_))` means the edit was applied but
/// could not be persisted.
pub type EditResult = Result<Option<StoreWarning>, MappingError>;

#[derive(Debug, Error)]
enum ReadError {
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("unexpected header {0:?}")]
    Header(Vec<String>),
}

/// Owns the mapping table and the file that persists it.
#[derive(Debug)]
pub struct MappingStore {
    path: PathBuf,
    mapping: ExtensionMapping,
}

impl MappingStore {
    /// Opens the store at `path`, loading or creating the mapping file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foldertidy::mapping_store::MappingStore;
    ///
    /// let (store, warning) = MappingStore::open("/tmp/data.csv", "Outros");
    /// if let Some(w) = warning {
    ///     eprintln!("{}", w);
    /// }
    /// println!("{} rows", store.mapping().len());
    /// ```
    pub fn open(
        path: impl Into<PathBuf>,
        fallback_literal: impl Into<String>,
    ) -> (Self, Option<StoreWarning>) {
        let mut store = Self {
            path: path.into(),
            mapping: ExtensionMapping::new(fallback_literal),
        };
        let warning = store.load();
        (store, warning)
    }

    /// Path of the mapping file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current table.
    pub fn mapping(&self) -> &ExtensionMapping {
        &self.mapping
    }

    /// Owned copy of the current table, for handing to the organizer.
    pub fn snapshot(&self) -> ExtensionMapping {
        self.mapping.clone()
    }

    fn default_table(&self) -> ExtensionMapping {
        ExtensionMapping::default_table(self.mapping.fallback_literal())
    }

    /// Reloads the table from storage.
    ///
    /// A missing file is created from the default table. An unreadable file
    /// is overwritten with the default table and read once more; if that read
    /// fails too, the in-memory default table is used.
    pub fn load(&mut self) -> Option<StoreWarning> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "mapping file missing, seeding defaults");
            self.mapping = self.default_table();
            return self.write().err().map(|source| StoreWarning::CreateFailed {
                path: self.path.clone(),
                source,
            });
        }

        let reason = match self.read() {
            Ok(mapping) => {
                self.mapping = mapping;
                return None;
            }
            Err(e) => e.to_string(),
        };

        warn!(path = %self.path.display(), %reason, "mapping file unreadable, resetting to defaults");
        self.mapping = self.default_table();
        if let Err(source) = self.write() {
            return Some(StoreWarning::WriteFailed {
                path: self.path.clone(),
                source,
            });
        }
        match self.read() {
            Ok(mapping) => self.mapping = mapping,
            Err(e) => warn!(path = %self.path.display(), error = %e, "re-read after reset failed"),
        }
        Some(StoreWarning::Reseeded {
            path: self.path.clone(),
            reason,
        })
    }

    fn read(&self) -> Result<ExtensionMapping, ReadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let headers = reader.headers()?;
        if headers.len() < 2
            || &headers[0] != EXTENSION_FIELDNAME
            || &headers[1] != CATEGORY_FIELDNAME
        {
            return Err(ReadError::Header(
                headers.iter().map(str::to_string).collect(),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.deserialize::<MappingEntry>() {
            let record = record?;
            let entry = MappingEntry::new(&record.extension, &record.category);
            if entry.extension.is_empty() || entry.category.is_empty() {
                continue;
            }
            rows.push(entry);
        }

        Ok(ExtensionMapping::from_entries(
            rows,
            self.mapping.fallback_literal(),
        ))
    }

    fn write(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(io::Error::from)?;
        writer
            .write_record([EXTENSION_FIELDNAME, CATEGORY_FIELDNAME])
            .map_err(io::Error::from)?;
        for entry in self.mapping.entries() {
            writer.serialize(entry).map_err(io::Error::from)?;
        }
        writer.flush()?;

        info!(path = %self.path.display(), rows = self.mapping.len(), "mapping file written");
        Ok(())
    }

    /// Rewrites the mapping file with the current table.
    pub fn save(&self) -> Option<StoreWarning> {
        self.write().err().map(|source| {
            warn!(path = %self.path.display(), error = %source, "could not save mapping file");
            StoreWarning::WriteFailed {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Case-insensitive membership test.
    pub fn exists(&self, extension: &str) -> bool {
        self.mapping.contains(extension)
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::DuplicateExtension`] if the extension is
    /// already present in any letter case.
    pub fn add_entry(&mut self, extension: &str, category: &str) -> EditResult {
        let entry = MappingEntry::new(extension, category);
        if entry.extension.is_empty() {
            return Err(MappingError::EmptyExtension);
        }
        if entry.category.is_empty() {
            return Err(MappingError::EmptyCategory);
        }
        if self.exists(&entry.extension) {
            return Err(MappingError::DuplicateExtension(extension.trim().to_string()));
        }
        self.mapping.push(entry);
        Ok(self.save())
    }

    /// Replaces the category of the row at 1-based `index`.
    pub fn edit_entry(&mut self, index: usize, category: &str) -> EditResult {
        let category = non_empty_category(category)?;
        let position = self.position_of(index)?;
        self.mapping.set_category(position, category);
        Ok(self.save())
    }

    /// Removes the rows at the given 1-based indices.
    ///
    /// All indices are checked before anything is removed. The file is
    /// written once.
    pub fn delete_entries(&mut self, indices: &[usize]) -> EditResult {
        let mut positions = indices
            .iter()
            .map(|&index| self.position_of(index))
            .collect::<Result<Vec<_>, _>>()?;
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();

        self.mapping.remove_descending(&positions);
        Ok(self.save())
    }

    /// Sets the category of the `others` row.
    ///
    /// Without an `others` row this does nothing and nothing is written.
    pub fn update_fallback(&mut self, category: &str) -> EditResult {
        let category = non_empty_category(category)?;
        if !self.mapping.set_others(category) {
            debug!("no 'others' row, fallback update ignored");
            return Ok(None);
        }
        Ok(self.save())
    }

    /// Discards the mapping file and reseeds it from the default table.
    pub fn restore_defaults(&mut self) -> Option<StoreWarning> {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "could not remove mapping file");
        }
        self.mapping = self.default_table();
        self.save()
    }

    fn position_of(&self, index: usize) -> Result<usize, MappingError> {
        let len = self.mapping.len();
        if index == 0 || index > len {
            return Err(MappingError::IndexOutOfRange { index, len });
        }
        Ok(index - 1)
    }
}

fn non_empty_category(category: &str) -> Result<String, MappingError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(MappingError::EmptyCategory);
    }
    Ok(category.to_string())
}
