use clap::Parser;
use foldertidy::cli::{Cli, run_cli};
use foldertidy::file_category::{ExtensionMapping, MappingEntry};
use foldertidy::file_organizer::{BatchError, OrganizerEngine};
use foldertidy::mapping_store::{MappingError, MappingStore, StoreWarning};
/// Integration tests for foldertidy
///
/// These tests drive the library the way the command line does: a mapping
/// store backed by a real CSV file, and the organizer working on a temporary
/// directory.
///
/// Test categories:
/// 1. Basic organization workflows
/// 2. Classification rules
/// 3. Collisions and per-file failures
/// 4. Mapping persistence
/// 5. Command-line glue
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory to organize plus a separate place for the mapping
/// file, so the mapping file is never organized itself.
struct TestFixture {
    temp_dir: TempDir,
    state_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        TestFixture {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            state_dir: TempDir::new().expect("Failed to create state directory"),
        }
    }

    /// Get the path to the directory being organized.
    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn mapping_path(&self) -> PathBuf {
        self.state_dir.path().join("data.csv")
    }

    fn open_store(&self) -> MappingStore {
        let (store, warning) = MappingStore::open(self.mapping_path(), "Outros");
        assert!(warning.is_none(), "unexpected warning: {:?}", warning);
        store
    }

    fn create_file(&self, name: &str, content: &str) {
        let mut file = File::create(self.path().join(name)).expect("Failed to create file");
        file.write_all(content.as_bytes())
            .expect("Failed to write file content");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name, name);
        }
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    /// Count regular files directly in the directory.
    fn count_files(&self) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .count()
    }

    /// Runs the command line with an isolated settings file.
    fn run(&self, args: &[&str]) -> bool {
        let config_path = self.state_dir.path().join("config.toml");
        fs::write(
            &config_path,
            format!("mapping_file = {:?}\n", self.mapping_path().display().to_string()),
        )
        .expect("Failed to write config");

        let mut argv = vec!["foldertidy".to_string(), "--config".to_string()];
        argv.push(config_path.display().to_string());
        argv.extend(args.iter().map(|a| a.to_string()));

        run_cli(Cli::parse_from(argv)).expect("run_cli failed")
    }
}

// ============================================================================
// Test Suite 1: Basic Organization
// ============================================================================

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();

    let result = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());

    assert!(result.overall_success);
    assert!(result.file_errors.is_empty());
    assert!(result.moved.is_empty());
    assert_eq!(fs::read_dir(fixture.path()).unwrap().count(), 0);
}

#[test]
fn test_organize_default_mapping_scenario() {
    let fixture = TestFixture::new();
    fixture.create_files(&["report.pdf", "photo.JPG", "notes", "script.sh"]);
    let store = fixture.open_store();

    let result = OrganizerEngine::organize(fixture.path(), &store.snapshot());

    assert!(result.overall_success);
    assert_eq!(result.file_errors, Vec::<String>::new());
    fixture.assert_file_exists("Documento/report.pdf");
    fixture.assert_file_exists("Imagem/photo.JPG");
    fixture.assert_file_exists("Outros/notes");
    fixture.assert_file_exists("Executavel/script.sh");
    assert_eq!(fixture.count_files(), 0);
}

#[test]
fn test_relative_path_touches_nothing() {
    let result = OrganizerEngine::organize(Path::new("relative/dir"), &ExtensionMapping::default());

    assert!(!result.overall_success);
    assert_eq!(result.file_errors.len(), 1);
    assert!(result.file_errors[0].contains("absolute"));
    assert!(!Path::new("relative").exists());
}

#[test]
fn test_missing_and_non_directory_paths_have_distinct_messages() {
    let fixture = TestFixture::new();
    fixture.create_file("plain.txt", "x");

    let missing = OrganizerEngine::organize(
        &fixture.path().join("nope"),
        &ExtensionMapping::default(),
    );
    let not_dir = OrganizerEngine::organize(
        &fixture.path().join("plain.txt"),
        &ExtensionMapping::default(),
    );

    assert!(matches!(missing.batch_error, Some(BatchError::NotFound(_))));
    assert!(matches!(not_dir.batch_error, Some(BatchError::NotADirectory(_))));
    assert_ne!(missing.file_errors[0], not_dir.file_errors[0]);
    fixture.assert_file_exists("plain.txt");
}

#[test]
fn test_subdirectories_are_left_alone() {
    let fixture = TestFixture::new();
    fs::create_dir(fixture.path().join("keep.txt")).unwrap();
    fs::write(fixture.path().join("keep.txt").join("inner.pdf"), "x").unwrap();
    fixture.create_file("top.pdf", "x");

    let result = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());

    assert!(result.is_clean());
    assert_eq!(result.moved.len(), 1);
    fixture.assert_file_exists("keep.txt/inner.pdf");
    fixture.assert_file_exists("Documento/top.pdf");
}

#[test]
fn test_organize_twice_is_stable() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt", "b.png"]);

    let first = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());
    let second = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());

    assert_eq!(first.moved.len(), 2);
    assert!(second.is_clean());
    assert!(second.moved.is_empty());
    fixture.assert_file_exists("Texto/a.txt");
}

// ============================================================================
// Test Suite 2: Classification
// ============================================================================

#[test]
fn test_lookup_ignores_extension_case() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.PDF", "c.PdF"]);

    let result = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());

    assert!(result.is_clean());
    fixture.assert_file_exists("Documento/a.pdf");
    fixture.assert_file_exists("Documento/b.PDF");
    fixture.assert_file_exists("Documento/c.PdF");
}

#[test]
fn test_fallback_literal_without_others_row() {
    let fixture = TestFixture::new();
    fixture.create_files(&["data.unknown", "plain.txt"]);
    let mapping = ExtensionMapping::from_entries(vec![MappingEntry::new(".txt", "Texto")], "Others");

    let result = OrganizerEngine::organize(fixture.path(), &mapping);

    assert!(result.is_clean());
    fixture.assert_file_exists("Others/data.unknown");
    fixture.assert_file_exists("Texto/plain.txt");
}

#[test]
fn test_dotfile_goes_to_fallback() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".gitignore", "archive.tar.gz"]);

    let result = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());

    assert!(result.is_clean());
    fixture.assert_file_exists("Outros/.gitignore");
    fixture.assert_file_exists("Compactado/archive.tar.gz");
}

#[test]
fn test_category_labels_are_case_sensitive_folders() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.aaa", "b.bbb"]);
    let mapping = ExtensionMapping::from_entries(
        vec![MappingEntry::new(".aaa", "Pasta"), MappingEntry::new(".bbb", "Pasta")],
        "Outros",
    );

    let result = OrganizerEngine::organize(fixture.path(), &mapping);

    assert!(result.is_clean());
    assert_eq!(result.category_counts().get("Pasta"), Some(&2));
    fixture.assert_file_exists("Pasta/a.aaa");
}

// ============================================================================
// Test Suite 3: Collisions and Failures
// ============================================================================

#[test]
fn test_collisions_use_smallest_free_number() {
    let fixture = TestFixture::new();
    let mapping = ExtensionMapping::default();

    for content in ["first", "second", "third"] {
        fixture.create_file("a.txt", content);
        let result = OrganizerEngine::organize(fixture.path(), &mapping);
        assert!(result.is_clean());
    }

    assert_eq!(fixture.read("Texto/a.txt"), "first");
    assert_eq!(fixture.read("Texto/a(1).txt"), "second");
    assert_eq!(fixture.read("Texto/a(2).txt"), "third");
}

#[test]
fn test_collision_reports_final_destination() {
    let fixture = TestFixture::new();
    fs::create_dir(fixture.path().join("Outros")).unwrap();
    fs::write(fixture.path().join("Outros").join("README"), "old").unwrap();
    fixture.create_file("README", "new");

    let result = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());

    assert!(result.is_clean());
    assert_eq!(
        result.moved[0].destination,
        fixture.path().join("Outros").join("README(1)")
    );
    assert_eq!(fixture.read("Outros/README"), "old");
}

#[test]
fn test_one_failing_file_does_not_stop_the_batch() {
    let fixture = TestFixture::new();
    // "zzz" is a plain file, so the category folder for ".bad" cannot be
    // created. It sorts after "a.bad", so it is still in place when that
    // file is processed.
    fixture.create_files(&["a.bad", "b.txt", "c.png", "zzz"]);
    let mapping = ExtensionMapping::from_entries(
        vec![
            MappingEntry::new(".bad", "zzz"),
            MappingEntry::new(".txt", "Texto"),
            MappingEntry::new(".png", "Imagem"),
        ],
        "Outros",
    );

    let result = OrganizerEngine::organize(fixture.path(), &mapping);

    assert!(result.overall_success);
    assert_eq!(result.file_errors.len(), 1, "errors: {:?}", result.file_errors);
    assert!(
        result.file_errors[0].contains("a.bad"),
        "error should name the file: {}",
        result.file_errors[0]
    );
    fixture.assert_file_exists("a.bad");
    fixture.assert_file_exists("Texto/b.txt");
    fixture.assert_file_exists("Imagem/c.png");
    fixture.assert_file_exists("Outros/zzz");
}

#[test]
fn test_each_blocked_file_gets_its_own_error() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.bad", "b.bad", "c.txt", "zzz"]);
    let mapping = ExtensionMapping::from_entries(
        vec![
            MappingEntry::new(".bad", "zzz"),
            MappingEntry::new(".txt", "Texto"),
        ],
        "Outros",
    );

    let result = OrganizerEngine::organize(fixture.path(), &mapping);

    assert!(result.overall_success);
    assert_eq!(result.file_errors.len(), 2, "errors: {:?}", result.file_errors);
    assert!(result.file_errors[0].contains("a.bad"));
    assert!(result.file_errors[1].contains("b.bad"));
    fixture.assert_file_exists("Texto/c.txt");
}

#[cfg(unix)]
#[test]
fn test_read_only_category_folder_is_a_file_error() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = TestFixture::new();
    fixture.create_files(&["notes.txt", "photo.png"]);
    let texto = fixture.path().join("Texto");
    fs::create_dir(&texto).unwrap();
    fs::set_permissions(&texto, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores directory permissions.
    let writable = File::create(texto.join(".write-check")).is_ok();
    if writable {
        let _ = fs::remove_file(texto.join(".write-check"));
        fs::set_permissions(&texto, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = OrganizerEngine::organize(fixture.path(), &ExtensionMapping::default());
    fs::set_permissions(&texto, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(result.overall_success);
    assert_eq!(result.file_errors.len(), 1, "errors: {:?}", result.file_errors);
    assert!(result.file_errors[0].contains("Permission denied"));
    assert!(result.file_errors[0].contains("notes.txt"));
    fixture.assert_file_exists("notes.txt");
    fixture.assert_file_not_exists("Texto/notes.txt");
    fixture.assert_file_exists("Imagem/photo.png");
}

// ============================================================================
// Test Suite 4: Mapping Persistence
// ============================================================================

#[test]
fn test_save_load_round_trip() {
    let fixture = TestFixture::new();
    let mut store = fixture.open_store();
    store.add_entry(".heic", "Imagem").unwrap();
    store.edit_entry(1, "Textos Simples").unwrap();

    let first = fixture.open_store().snapshot();
    assert!(store.save().is_none());
    let second = fixture.open_store().snapshot();

    assert_eq!(first, second);
    assert_eq!(&first, store.mapping());
}

#[test]
fn test_duplicate_extension_rejected_any_case() {
    let fixture = TestFixture::new();
    let mut store = fixture.open_store();
    let before = fs::read_to_string(fixture.mapping_path()).unwrap();

    let result = store.add_entry(".ZIP", "X");

    assert!(matches!(result, Err(MappingError::DuplicateExtension(_))));
    assert_eq!(fs::read_to_string(fixture.mapping_path()).unwrap(), before);
    assert_eq!(store.mapping().categorize(".zip"), "Compactado");
}

#[test]
fn test_custom_mapping_drives_organizer() {
    let fixture = TestFixture::new();
    let mut store = fixture.open_store();
    store.add_entry(".heic", "Fotos").unwrap();
    store.update_fallback("Diversos").unwrap();
    fixture.create_files(&["img.HEIC", "thing.xyz"]);

    let reloaded = fixture.open_store();
    let result = OrganizerEngine::organize(fixture.path(), reloaded.mapping());

    assert!(result.is_clean());
    fixture.assert_file_exists("Fotos/img.HEIC");
    fixture.assert_file_exists("Diversos/thing.xyz");
}

#[test]
fn test_corrupt_mapping_file_recovers() {
    let fixture = TestFixture::new();
    fs::write(fixture.mapping_path(), "garbage without header\n\"unterminated").unwrap();

    let (store, warning) = MappingStore::open(fixture.mapping_path(), "Outros");

    assert!(matches!(warning, Some(StoreWarning::Reseeded { .. })));
    assert_eq!(store.mapping(), &ExtensionMapping::default());
    let content = fs::read_to_string(fixture.mapping_path()).unwrap();
    assert!(content.starts_with("File extension,File Type"));
}

// ============================================================================
// Test Suite 5: Command Line
// ============================================================================

#[test]
fn test_cli_organizes_directory() {
    let fixture = TestFixture::new();
    fixture.create_files(&["report.pdf", "song.mp3"]);
    let dir = fixture.path().display().to_string();

    assert!(fixture.run(&[&dir]));
    fixture.assert_file_exists("Documento/report.pdf");
    fixture.assert_file_exists("Audio/song.mp3");
    assert!(fixture.mapping_path().exists());
}

#[test]
fn test_cli_dry_run_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["report.pdf"]);
    let dir = fixture.path().display().to_string();

    assert!(fixture.run(&[&dir, "--dry-run"]));
    fixture.assert_file_exists("report.pdf");
    fixture.assert_file_not_exists("Documento");
}

#[test]
fn test_cli_relative_path_fails() {
    let fixture = TestFixture::new();

    assert!(!fixture.run(&["relative/dir", "--show-log"]));
}

#[test]
fn test_cli_mapping_commands() {
    let fixture = TestFixture::new();

    assert!(fixture.run(&["mappings", "add", ".heic", "Fotos"]));
    assert!(!fixture.run(&["mappings", "add", ".HEIC", "Outra"]));
    assert!(fixture.run(&["mappings", "delete", "1", "2"]));
    assert!(fixture.run(&["mappings", "list"]));

    let store = fixture.open_store();
    assert!(store.exists(".heic"));
    assert!(!store.exists(".txt"));
    assert!(!store.exists(".md"));

    assert!(fixture.run(&["mappings", "restore"]));
    assert_eq!(fixture.open_store().mapping(), &ExtensionMapping::default());
}
