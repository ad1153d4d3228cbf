//! Module name to file index over the library search path

use crate::error::LibraryError;
use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where and how to look for library modules
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibrarySearch {
    /// Directories to scan, highest priority first
    pub directories: Vec<PathBuf>,
    /// File suffixes that mark a module file, highest priority first
    pub suffixes: Vec<String>,
    /// Whether module names must match file names exactly
    pub case_sensitive: bool,
}

impl LibrarySearch {
    /// Creates a search configuration
    pub fn new<D, S>(
        directories: impl IntoIterator<Item = D>,
        suffixes: impl IntoIterator<Item = S>,
        case_sensitive: bool,
    ) -> Self
    where
        D: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            case_sensitive,
        }
    }
}

impl Default for LibrarySearch {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            suffixes: vec![".v".to_owned()],
            case_sensitive: true,
        }
    }
}

/// Outcome of [`LibraryIndex::build`]
#[derive(Debug)]
pub struct IndexBuild {
    /// The index over everything that could be scanned
    pub index: LibraryIndex,
    /// Directories that were skipped
    pub errors: Vec<LibraryError>,
}

/// Read-only map from module name to the files that define it
///
/// The first candidate for a name is its resolution. Later candidates come
/// from lower priority directories or suffixes and are kept only for
/// diagnostics.
#[derive(Clone, Debug, Default)]
pub struct LibraryIndex {
    modules: IndexMap<String, Vec<PathBuf>>,
    case_sensitive: bool,
}

impl LibraryIndex {
    /// Scans the search directories and builds the index
    ///
    /// Directories are visited in order. Within a directory, each file counts
    /// for the first suffix it ends with; files are taken suffix by suffix in
    /// suffix order, and by file name within a suffix. The first file seen for
    /// a module name wins.
    ///
    /// A directory that cannot be read is reported in [`IndexBuild::errors`]
    /// and scanning carries on with the rest.
    pub fn build(search: &LibrarySearch) -> IndexBuild {
        let mut index = Self {
            modules: IndexMap::new(),
            case_sensitive: search.case_sensitive,
        };
        let mut errors = Vec::new();

        for dir in &search.directories {
            let names = match list_directory(dir) {
                Ok(names) => names,
                Err(source) => {
                    warn!(directory = %dir.display(), error = %source, "skipping library directory");
                    errors.push(LibraryError::ScanDirectory {
                        path: dir.clone(),
                        source,
                    });
                    continue;
                }
            };
            info!(directory = %dir.display(), "indexing library");

            let mut matches: Vec<(usize, &str, &str)> = names
                .iter()
                .filter_map(|name| {
                    search.suffixes.iter().enumerate().find_map(|(rank, suffix)| {
                        name.strip_suffix(suffix.as_str())
                            .filter(|stem| !stem.is_empty())
                            .map(|stem| (rank, name.as_str(), stem))
                    })
                })
                .collect();
            matches.sort_unstable();

            for (_, name, stem) in matches {
                index.insert(stem, dir.join(name));
            }
        }

        IndexBuild { index, errors }
    }

    fn insert(&mut self, stem: &str, path: PathBuf) {
        let key = self.key(stem);
        let candidates = self.modules.entry(key).or_default();
        if let Some(winner) = candidates.first() {
            debug!(
                module = stem,
                shadowed = %path.display(),
                by = %winner.display(),
                "library module defined more than once"
            );
        }
        candidates.push(path);
    }

    fn key(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_owned()
        } else {
            name.to_lowercase()
        }
    }

    /// The file that defines module `name`
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.candidates(name).first().map(PathBuf::as_path)
    }

    /// Every file that could define module `name`, winner first
    pub fn candidates(&self, name: &str) -> &[PathBuf] {
        self.modules
            .get(&self.key(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether module `name` is in the index
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(&self.key(name))
    }

    /// Number of distinct modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Whether module names were matched case-sensitively
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Module keys and resolved files in discovery order
    ///
    /// Keys are lower-cased when the index is case-insensitive.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.modules.iter().filter_map(|(key, candidates)| {
            candidates
                .first()
                .map(|path| (key.as_str(), path.as_path()))
        })
    }
}

/// File names in `dir`, excluding subdirectories and names that are not UTF-8
fn list_directory(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(directory = %dir.display(), error = %err, "unreadable directory entry");
                continue;
            }
        };
        if entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(file = ?raw, "ignoring non UTF-8 file name"),
        }
    }
    Ok(names)
}
