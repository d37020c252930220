//! Expansion of search roots into the file list handed to the engine.
//!
//! Directories are walked with `ignore`, so `.gitignore`, `.ignore` and
//! hidden-file rules apply even outside a Git checkout. Files named
//! explicitly on the command line are always kept.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use shapegrep_core::Mode;
use shapegrep_syntax::LanguageRegistry;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Decides which walked files are worth searching.
pub(crate) struct FileFilter<'a> {
    registry: &'a LanguageRegistry,
    mode: Mode,
}

impl<'a> FileFilter<'a> {
    pub(crate) const fn new(registry: &'a LanguageRegistry, mode: Mode) -> Self {
        Self { registry, mode }
    }

    /// Text mode reads any file; structural modes need a grammar.
    fn accepts(&self, path: &Path) -> bool {
        !self.mode.is_structural() || self.registry.supports(path)
    }
}

/// Returns the sorted, deduplicated files under `roots`.
pub(crate) fn discover(roots: &[PathBuf], filter: &FileFilter<'_>) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();
    for root in roots {
        if root.is_file() {
            files.push(root.clone());
        } else if root.is_dir() {
            walk(root, filter, &mut files);
        } else {
            return Err(AppError::MissingPath { path: root.clone() });
        }
    }
    files.sort();
    files.dedup();
    debug!(roots = roots.len(), files = files.len(), "discovered files");
    Ok(files)
}

fn walk(root: &Path, filter: &FileFilter<'_>, files: &mut Vec<PathBuf>) {
    let mut builder = WalkBuilder::new(root);
    builder.require_git(false);

    for walked in builder.build() {
        let entry = match walked {
            Ok(entry) => entry,
            Err(error) => {
                warn!(root = %root.display(), %error, "skipping unreadable entry");
                continue;
            }
        };
        let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
        if is_file && filter.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }
}
