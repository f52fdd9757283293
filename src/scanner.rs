use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Entry-file scanner for expanding configured glob patterns.
///
/// The `FileScanner` recursively walks a project directory and collects every
/// file matching the configured entry patterns. It automatically skips
/// directories that should never contain entry files, such as `node_modules`
/// and hidden directories (those starting with `.`).
///
/// The result is absolute, deduplicated, and sorted, so the module graph is
/// traversed in the same order on every run.
///
/// # Example
///
/// ```no_run
/// use openapi_from_typescript::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan(&["src/routes/**/*.ts".to_string()]).unwrap();
/// println!("Found {} entry files", result.entry_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of an entry scan.
///
/// Contains the list of matched entry files and any warnings encountered
/// while walking the directory tree.
#[derive(Debug)]
pub struct ScanResult {
    /// Absolute paths of all matched entry files, sorted and deduplicated
    pub entry_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` rooted at the specified directory.
    ///
    /// Patterns passed to [`FileScanner::scan`] are matched against paths
    /// relative to this root.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the directory tree and collects all files matching `patterns`.
    ///
    /// This method recursively traverses the tree starting from the root
    /// path and matches each file's root-relative path against the compiled
    /// pattern set. It automatically skips:
    /// - The `node_modules` directory
    /// - Hidden directories (starting with `.`)
    ///
    /// If any directories or files cannot be accessed, warnings are logged
    /// and added to the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern is not a valid glob.
    pub fn scan(&self, patterns: &[String]) -> Result<ScanResult> {
        let glob_set = build_glob_set(patterns)?;

        let mut entry_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                // Skip node_modules and hidden directories
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_node_modules = file_name == "node_modules";

                !is_hidden && !is_node_modules
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if !path.is_file() {
                        continue;
                    }

                    let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
                    if !glob_set.is_match(relative) {
                        continue;
                    }

                    match path.canonicalize() {
                        Ok(canonical) => entry_files.push(canonical),
                        Err(e) => {
                            let warning =
                                format!("Failed to canonicalize {}: {}", path.display(), e);
                            warn!("{}", warning);
                            warnings.push(warning);
                        }
                    }
                }
                Err(e) => {
                    // Record warning for inaccessible directories/files
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        entry_files.sort();
        entry_files.dedup();

        Ok(ScanResult {
            entry_files,
            warnings,
        })
    }
}

/// Compiles the configured entry patterns into a single glob set.
fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("Invalid entry pattern '{}'", pattern))?;
        builder.add(glob);
    }
    builder
        .build()
        .context("Failed to compile entry patterns")
}
