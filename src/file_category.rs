/// Extension to category mapping for organizing files by type.
///
/// This module owns the in-memory table that maps file suffixes (".pdf") to
/// category folder names ("Documento"), the canonical default table, and the
/// suffix extraction rules used when classifying a file.
///
/// # Examples
///
/// ```
/// use foldertidy::file_category::ExtensionMapping;
///
/// let mapping = ExtensionMapping::default();
/// assert_eq!(mapping.categorize(".pdf"), "Documento");
/// assert_eq!(mapping.categorize(".JPG"), "Imagem");
/// assert_eq!(mapping.categorize(""), "Outros");
/// ```
use serde::{Deserialize, Serialize};

/// Key of the row that names the category for unmapped extensions.
pub const OTHERS_KEY: &str = "others";

/// Fallback category used when the mapping has no `others` row.
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Outros";

/// Canonical default table, in persisted row order.
const DEFAULT_TABLE: &[(&str, &str)] = &[
    (".txt", "Texto"),
    (".md", "Texto"),
    (".csv", "Texto"),
    (".log", "Texto"),
    (".json", "Texto"),
    (".xml", "Texto"),
    (".yaml", "Texto"),
    (".yml", "Texto"),
    (".ini", "Texto"),
    (".mp3", "Audio"),
    (".wav", "Audio"),
    (".flac", "Audio"),
    (".aac", "Audio"),
    (".ogg", "Audio"),
    (".wma", "Audio"),
    (".m4a", "Audio"),
    (".aiff", "Audio"),
    (".mp4", "Video"),
    (".mkv", "Video"),
    (".avi", "Video"),
    (".mov", "Video"),
    (".wmv", "Video"),
    (".flv", "Video"),
    (".webm", "Video"),
    (".mpeg", "Video"),
    (".mpg", "Video"),
    (".png", "Imagem"),
    (".jpg", "Imagem"),
    (".jpeg", "Imagem"),
    (".gif", "Imagem"),
    (".bmp", "Imagem"),
    (".tiff", "Imagem"),
    (".webp", "Imagem"),
    (".svg", "Imagem"),
    (".ico", "Imagem"),
    (".pdf", "Documento"),
    (".doc", "Documento"),
    (".docx", "Documento"),
    (".xls", "Documento"),
    (".xlsx", "Documento"),
    (".ppt", "Documento"),
    (".pptx", "Documento"),
    (".odt", "Documento"),
    (".ods", "Documento"),
    (".odp", "Documento"),
    (".zip", "Compactado"),
    (".rar", "Compactado"),
    (".7z", "Compactado"),
    (".tar", "Compactado"),
    (".gz", "Compactado"),
    (".bz2", "Compactado"),
    (".xz", "Compactado"),
    (".iso", "Compactado"),
    (".py", "Codigo"),
    (".java", "Codigo"),
    (".c", "Codigo"),
    (".cpp", "Codigo"),
    (".js", "Codigo"),
    (".ts", "Codigo"),
    (".html", "Codigo"),
    (".css", "Codigo"),
    (".php", "Codigo"),
    (".rb", "Codigo"),
    (".go", "Codigo"),
    (".rs", "Codigo"),
    (".swift", "Codigo"),
    (".exe", "Executavel"),
    (".msi", "Executavel"),
    (".bat", "Executavel"),
    (".sh", "Executavel"),
    (".app", "Executavel"),
    (".jar", "Executavel"),
    (".bin", "Executavel"),
    (".cmd", "Executavel"),
    (OTHERS_KEY, DEFAULT_FALLBACK_CATEGORY),
];

/// One row of the mapping: a suffix (or `others`) and its category label.
///
/// Field names follow the persisted CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Suffix including the leading dot, lower-cased, or [`OTHERS_KEY`].
    #[serde(rename = "File extension")]
    pub extension: String,
    /// Destination folder name. Stored verbatim.
    #[serde(rename = "File Type")]
    pub category: String,
}

impl MappingEntry {
    /// Creates an entry, normalizing the extension to lower case.
    pub fn new(extension: &str, category: &str) -> Self {
        Self {
            extension: extension.trim().to_lowercase(),
            category: category.trim().to_string(),
        }
    }

    /// Returns true if this is the `others` row.
    pub fn is_others(&self) -> bool {
        self.extension == OTHERS_KEY
    }
}

/// Ordered extension to category table.
///
/// Extensions are unique case-insensitively. Row order is significant: it is
/// the order rows are persisted in and the basis of the 1-based indices used
/// by [`crate::mapping_store::MappingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMapping {
    entries: Vec<MappingEntry>,
    fallback_literal: String,
}

impl ExtensionMapping {
    /// Creates an empty mapping with the given fallback literal.
    pub fn new(fallback_literal: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            fallback_literal: fallback_literal.into(),
        }
    }

    /// Builds the canonical default table.
    pub fn default_table(fallback_literal: impl Into<String>) -> Self {
        let mut mapping = Self::new(fallback_literal);
        for (extension, category) in DEFAULT_TABLE {
            mapping.upsert(MappingEntry::new(extension, category));
        }
        mapping
    }

    /// Builds a mapping from rows, in order.
    ///
    /// A repeated extension overwrites the category of the earlier row and
    /// keeps the earlier position.
    pub fn from_entries(
        entries: impl IntoIterator<Item = MappingEntry>,
        fallback_literal: impl Into<String>,
    ) -> Self {
        let mut mapping = Self::new(fallback_literal);
        for entry in entries {
            mapping.upsert(entry);
        }
        mapping
    }

    fn upsert(&mut self, entry: MappingEntry) {
        match self.position(&entry.extension) {
            Some(i) => self.entries[i].category = entry.category,
            None => self.entries.push(entry),
        }
    }

    fn position(&self, extension: &str) -> Option<usize> {
        let needle = extension.trim().to_lowercase();
        self.entries.iter().position(|e| e.extension == needle)
    }

    /// Rows in persisted order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The literal used when there is no `others` row.
    pub fn fallback_literal(&self) -> &str {
        &self.fallback_literal
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, extension: &str) -> bool {
        self.position(extension).is_some()
    }

    /// Looks up the category of an exact suffix, ignoring case.
    ///
    /// The `others` row is not consulted here; see [`Self::categorize`].
    pub fn category_for(&self, suffix: &str) -> Option<&str> {
        if suffix.is_empty() || suffix.eq_ignore_ascii_case(OTHERS_KEY) {
            return None;
        }
        self.position(suffix)
            .map(|i| self.entries[i].category.as_str())
    }

    /// Category assigned to files whose suffix has no row.
    pub fn fallback_category(&self) -> &str {
        self.entries
            .iter()
            .find(|e| e.is_others())
            .map(|e| e.category.as_str())
            .unwrap_or(&self.fallback_literal)
    }

    /// Determines the category for a suffix as returned by [`file_suffix`].
    ///
    /// # Examples
    ///
    /// ```
    /// use foldertidy::file_category::ExtensionMapping;
    ///
    /// let mapping = ExtensionMapping::new("Others");
    /// assert_eq!(mapping.categorize(".pdf"), "Others");
    /// ```
    pub fn categorize(&self, suffix: &str) -> &str {
        self.category_for(suffix)
            .unwrap_or_else(|| self.fallback_category())
    }

    pub(crate) fn push(&mut self, entry: MappingEntry) {
        self.entries.push(entry);
    }

    /// Replaces the category at a 0-based position.
    pub(crate) fn set_category(&mut self, position: usize, category: String) {
        self.entries[position].category = category;
    }

    /// Removes 0-based positions. Expects them sorted in descending order.
    pub(crate) fn remove_descending(&mut self, positions: &[usize]) {
        for &position in positions {
            self.entries.remove(position);
        }
    }

    /// Replaces the category of the `others` row. Returns false if absent.
    pub(crate) fn set_others(&mut self, category: String) -> bool {
        match self.entries.iter_mut().find(|e| e.is_others()) {
            Some(entry) => {
                entry.category = category;
                true
            }
            None => false,
        }
    }
}

impl Default for ExtensionMapping {
    fn default() -> Self {
        Self::default_table(DEFAULT_FALLBACK_CATEGORY)
    }
}

/// Returns the suffix of a file name: the text from the last `.` onwards.
///
/// Names without a dot, names whose only dot is the first character
/// (".gitignore") and names ending in a dot have an empty suffix.
///
/// ```
/// use foldertidy::file_category::file_suffix;
///
/// assert_eq!(file_suffix("report.pdf"), ".pdf");
/// assert_eq!(file_suffix("archive.tar.gz"), ".gz");
/// assert_eq!(file_suffix(".gitignore"), "");
/// assert_eq!(file_suffix("notes"), "");
/// ```
pub fn file_suffix(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => &name[i..],
        _ => "",
    }
}
