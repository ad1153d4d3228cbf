//! Compilation driver for the resolution services
//!
//! This crate ties the pieces together for one run of the compiler:
//!
//! - [`CompilerConfig`]: settings read once at startup, from code or TOML
//! - [`Session`]: owns the interners, generation policy, system function
//!   table, library index, library file record and missing module tracker,
//!   and answers elaboration's questions
//! - [`CompilationSummary`]: what is left to report when the run ends
//!
//! # Usage
//!
//! ```rust,ignore
//! use iv_driver::{CompilerConfig, ModuleRequest, Session};
//!
//! let session = Session::start(CompilerConfig::load("ivy.toml")?)?;
//! let name = session.lex_strings().intern("and2");
//! if let ModuleRequest::Found { path, first_load: true } = session.request_module(name) {
//!     // parse `path`
//! }
//! session.finish().into_result()?;
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod summary;

pub use config::{CompilerConfig, DebugFlags, WarningFlags};
pub use error::{ConfigError, Diagnostic, SourceError};
pub use session::{ModuleRequest, Session, SourceFile, SourceOrigin};
pub use summary::CompilationSummary;
