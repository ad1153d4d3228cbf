//! Which source files came from a library
//!
//! The lexer checks every file name it switches to (including names from
//! `` `line `` directives) against this record, so that modules parsed from a
//! library file know they are library modules.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Shared record of library and primary source files
///
/// Clones share the same record. A file marked as a library file stays one
/// for the rest of the run.
#[derive(Clone, Debug, Default)]
pub struct LibraryFiles {
    inner: Arc<RwLock<FxHashMap<PathBuf, bool>>>,
}

impl LibraryFiles {
    /// Creates an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as a library file
    ///
    /// Returns `true` the first time a path is marked and `false` afterwards.
    pub fn mark_library(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        // The map only ever gains entries, so a poisoned lock still holds a
        // consistent record
        let mut files = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match files.get_mut(path) {
            Some(true) => false,
            Some(flag) => {
                *flag = true;
                debug!(file = %path.display(), "primary file reclassified as library file");
                true
            }
            None => {
                files.insert(path.to_path_buf(), true);
                debug!(file = %path.display(), "library file");
                true
            }
        }
    }

    /// Records `path` as a primary design file unless it is already known
    pub fn note_primary(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !files.contains_key(path) {
            files.insert(path.to_path_buf(), false);
        }
    }

    /// Whether `path` is a library file
    pub fn classify(&self, path: impl AsRef<Path>) -> bool {
        let files = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        files.get(path.as_ref()).copied().unwrap_or(false)
    }

    /// Whether `path` has been seen at all
    pub fn is_known(&self, path: impl AsRef<Path>) -> bool {
        let files = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        files.contains_key(path.as_ref())
    }

    /// Library files, sorted by path
    pub fn library_paths(&self) -> Vec<PathBuf> {
        let files = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<_> = files
            .iter()
            .filter(|&(_, &library)| library)
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Number of files seen
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no files have been seen
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_then_classify() {
        let files = LibraryFiles::new();
        assert!(files.mark_library("lib/and2.v"));
        assert!(files.classify("lib/and2.v"));
        assert!(!files.classify("top.v"));
    }

    #[test]
    fn test_mark_is_idempotent() {
        let files = LibraryFiles::new();
        assert!(files.mark_library("lib/and2.v"));
        assert!(!files.mark_library("lib/and2.v"));
        assert_eq!(files.len(), 1);
        assert_eq!(files.library_paths(), [PathBuf::from("lib/and2.v")]);
    }

    #[test]
    fn test_primary_never_demotes_library() {
        let files = LibraryFiles::new();
        files.mark_library("cells.v");
        files.note_primary("cells.v");
        assert!(files.classify("cells.v"));
    }

    #[test]
    fn test_primary_can_be_promoted() {
        let files = LibraryFiles::new();
        files.note_primary("top.v");
        assert!(files.is_known("top.v"));
        assert!(!files.classify("top.v"));
        assert!(files.mark_library("top.v"));
        assert!(files.classify("top.v"));
    }

    #[test]
    fn test_clones_share_record() {
        let files = LibraryFiles::new();
        let shared = files.clone();
        files.mark_library("lib/or2.v");
        assert!(shared.classify("lib/or2.v"));
    }
}
