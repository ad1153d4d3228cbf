//! Error types for system function tables

use std::io;
use std::path::PathBuf;

/// What was wrong with a table record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedKind {
    /// Function names must start with `$`
    #[error("function name must start with `$`")]
    NotASystemName,

    /// The record ends after the function name
    #[error("no function type")]
    MissingType,

    /// The type keyword is not one of the `vpiSysFunc*` kinds
    #[error("unknown function type `{0}`")]
    UnknownType(String),

    /// `vpiSysFuncSized` without a width
    #[error("missing width")]
    MissingWidth,

    /// Width is not a positive integer
    #[error("invalid width `{0}`")]
    InvalidWidth(String),

    /// A signedness flag other than `signed`/`unsigned`
    #[error("unknown flag `{0}`")]
    UnknownFlag(String),

    /// Extra text after a type that takes no arguments
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
}

/// Errors that occur while loading a system function table
#[derive(Debug, thiserror::Error)]
pub enum SysFuncTableError {
    /// The file exists but could not be read
    #[error("cannot read system function table {}", .path.display())]
    Io {
        /// Table file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// A record in the file is malformed; nothing from the file was merged
    #[error("{}:{line}: {kind} in `{text}`", .path.display())]
    Malformed {
        /// Table file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong
        kind: MalformedKind,
        /// The offending line, trimmed
        text: String,
    },
}
