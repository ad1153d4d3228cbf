//! Error types for library scanning

use std::io;
use std::path::PathBuf;

/// Errors that occur while building the library index
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// A search directory is missing or unreadable; it was skipped
    #[error("cannot scan library directory {}", .path.display())]
    ScanDirectory {
        /// The directory
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },
}
