//! Error and diagnostic types for the driver

use iv_generation::GenerationError;
use iv_library::LibraryError;
use iv_sysfunc::SysFuncTableError;
use std::io;
use std::path::{Path, PathBuf};

/// Errors in the compiler configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("cannot read configuration {}", .path.display())]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid TOML or has unknown keys
    #[error("invalid configuration{}", origin(.path.as_deref()))]
    Parse {
        /// Configuration file, if the text came from one
        path: Option<PathBuf>,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// A generation flag is not recognised
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// `integer_width` must be positive
    #[error("invalid integer width {0}")]
    InvalidIntegerWidth(u32),

    /// Library suffixes cannot be empty
    #[error("invalid library suffix `{0}`")]
    InvalidSuffix(String),

    /// Not a warning class
    #[error("unknown warning class `{0}`")]
    UnknownWarning(String),
}

/// Errors when the lexer switches to a source file
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The path has no text form to intern
    #[error("source path {} is not valid UTF-8", .path.display())]
    NonUtf8Path {
        /// The offending path
        path: PathBuf,
    },
}

/// A problem found during startup that does not stop compilation
///
/// These are collected and reported together at the end of the run.
#[derive(Debug, thiserror::Error)]
pub enum Diagnostic {
    /// A system function table could not be loaded
    #[error(transparent)]
    SysFuncTable(#[from] SysFuncTableError),

    /// A library directory could not be scanned
    #[error(transparent)]
    Library(#[from] LibraryError),
}

fn origin(path: Option<&Path>) -> String {
    path.map(|path| format!(" {}", path.display()))
        .unwrap_or_default()
}
