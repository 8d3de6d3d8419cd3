//! Document discovery by filesystem walking.

use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::SyncError;

/// Discovers document files under a source directory.
///
/// Hidden entries are skipped and `.gitignore` rules are honored, also
/// outside of git repositories. Only files whose extension is in the
/// configured list are returned.
pub struct Scanner {
    source_dir: PathBuf,
    extensions: Vec<String>,
}

impl Scanner {
    /// Create a new Scanner.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Root directory to scan
    /// * `extensions` - Document extensions (lowercase, without the dot)
    #[must_use]
    pub fn new(source_dir: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            source_dir,
            extensions,
        }
    }

    /// Scan the source directory and return document paths sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the source directory does not exist.
    /// Unreadable entries below it are logged and skipped.
    pub fn scan(&self) -> Result<Vec<PathBuf>, SyncError> {
        if !self.source_dir.is_dir() {
            return Err(SyncError::Io {
                path: self.source_dir.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "source directory not found"),
            });
        }

        let mut builder = WalkBuilder::new(&self.source_dir);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .follow_links(false);

        let mut paths = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|t| t.is_file())
                        && self.has_document_extension(entry.path())
                    {
                        paths.push(entry.into_path());
                    }
                }
                Err(err) => warn!("Skipping unreadable entry: {err}"),
            }
        }

        paths.sort();
        debug!(
            count = paths.len(),
            dir = %self.source_dir.display(),
            "Scanned documents"
        );
        Ok(paths)
    }

    fn has_document_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}
