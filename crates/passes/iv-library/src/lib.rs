//! Library module resolution
//!
//! When elaboration instantiates a module that no source file defined, the
//! compiler goes looking for it in the library directories. This crate
//! provides the pieces of that lookup:
//!
//! - **Library index**: module name to defining file, built once by scanning
//!   the search directories in order
//! - **Library files**: which source files were pulled in from a library
//!   rather than named by the user
//! - **Missing modules**: names that could not be found, counted for the
//!   end-of-run summary
//!
//! # Usage
//!
//! ```rust,ignore
//! use iv_library::{LibraryIndex, LibrarySearch};
//!
//! let build = LibraryIndex::build(&LibrarySearch::new(dirs, [".v"], true));
//! for err in &build.errors {
//!     // report, then carry on
//! }
//! let path = build.index.resolve("and2");
//! ```

pub mod error;
pub mod files;
pub mod index;
pub mod missing;

pub use error::LibraryError;
pub use files::LibraryFiles;
pub use index::{IndexBuild, LibraryIndex, LibrarySearch};
pub use missing::{MissingModule, MissingModules, MissingReport};
