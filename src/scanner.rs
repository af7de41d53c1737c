use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all
/// Rust source files. It automatically skips the `target` directory, hidden
/// directories (those starting with `.`), and any directory names the user
/// excluded on the command line.
pub struct FileScanner {
    root_path: PathBuf,
    excluded_dirs: Vec<String>,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered Rust files and any warnings encountered
/// during scanning.
pub struct ScanResult {
    /// List of paths to all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            excluded_dirs: Vec::new(),
        }
    }

    /// Adds directory names to skip during traversal, on top of the built-in
    /// `target` and hidden-directory exclusions.
    pub fn with_excluded_dirs(mut self, excluded_dirs: Vec<String>) -> Self {
        self.excluded_dirs = excluded_dirs;
        self
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// Files are returned in a deterministic order: paths are sorted
    /// lexicographically, except that `main.rs` files sort first so that the
    /// service-level comment block (conventionally in the crate entry point)
    /// is processed before any operation blocks.
    ///
    /// Inaccessible directories and files produce warnings, not errors, and
    /// scanning continues.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";
                let is_excluded =
                    e.file_type().is_dir() && self.excluded_dirs.iter().any(|d| *d == file_name);

                if is_excluded {
                    debug!("Excluding directory: {}", e.path().display());
                }

                !is_hidden && !is_target && !is_excluded
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort_by(|a, b| {
            let a_main = a.file_name().is_some_and(|n| n == "main.rs");
            let b_main = b.file_name().is_some_and(|n| n == "main.rs");
            b_main.cmp(&a_main).then_with(|| a.cmp(b))
        });

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}
