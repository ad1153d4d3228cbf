//! System function return types
//!
//! When the expression elaborator meets a call such as `$time` it needs the
//! width, signedness and kind of the value the call produces. This crate
//! keeps that table: a fixed set of always-available built-ins, extended by
//! table files loaded at startup.
//!
//! Later definitions replace earlier ones of the same name, including the
//! built-ins. Loading is fail-atomic: a table file with any malformed record
//! contributes nothing.

pub mod error;
pub mod parse;

pub use error::{MalformedKind, SysFuncTableError};
pub use parse::parse_table;

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Width of time values
pub const TIME_WIDTH: u32 = 64;

/// Width of `integer` variables unless configured otherwise
pub const DEFAULT_INTEGER_WIDTH: u32 = 32;

/// Kind of value a system function returns
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// No value
    Void,
    /// Real number
    Real,
    /// Two-state bits
    Bool,
    /// Four-state bits
    Logic,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Void => "void",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::Logic => "logic",
        })
    }
}

/// Type information of a call result
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReturnType {
    /// Value kind
    pub ty: VariableType,
    /// Width in bits: 0 for void, 1 for real
    pub width: u32,
    /// Whether the result is signed
    pub signed: bool,
}

impl ReturnType {
    /// Creates a return type
    pub const fn new(ty: VariableType, width: u32, signed: bool) -> Self {
        Self { ty, width, signed }
    }
}

/// What functions not in the table return: an unsigned 32-bit vector
pub const DEFAULT_RETURN: ReturnType = ReturnType::new(VariableType::Logic, 32, false);

/// What `vpiSysFuncReal` functions return, built-in or loaded
pub const REAL_RETURN: ReturnType = ReturnType::new(VariableType::Real, 1, true);

/// One entry of the table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SysFuncSignature {
    /// Function name including the leading `$`
    pub name: String,
    /// Result type
    pub ret: ReturnType,
}

impl SysFuncSignature {
    /// Creates a signature
    pub fn new(name: impl Into<String>, ret: ReturnType) -> Self {
        Self {
            name: name.into(),
            ret,
        }
    }
}

impl fmt::Display for SysFuncSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.ret.signed { "signed" } else { "unsigned" };
        write!(f, "{}: {} {sign} [{}]", self.name, self.ret.ty, self.ret.width)
    }
}

/// Result of [`SysFuncTable::load_table`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file does not exist; nothing was loaded
    Absent,
    /// Every record was merged
    Loaded {
        /// Number of distinct names defined by the file
        count: usize,
    },
}

/// Table of system function return types, keyed by exact name
#[derive(Clone, Debug)]
pub struct SysFuncTable {
    entries: IndexMap<String, SysFuncSignature>,
    integer_width: u32,
}

impl SysFuncTable {
    /// Creates an empty table
    #[must_use]
    pub fn new(integer_width: u32) -> Self {
        Self {
            entries: IndexMap::new(),
            integer_width,
        }
    }

    /// Creates a table holding the built-in functions
    #[must_use]
    pub fn with_defaults(integer_width: u32) -> Self {
        let mut table = Self::new(integer_width);
        let builtins = [
            ("$realtime", REAL_RETURN),
            ("$bitstoreal", REAL_RETURN),
            ("$itor", REAL_RETURN),
            ("$realtobits", ReturnType::new(VariableType::Logic, 64, false)),
            ("$time", ReturnType::new(VariableType::Logic, TIME_WIDTH, false)),
            ("$stime", ReturnType::new(VariableType::Logic, 32, false)),
            ("$simtime", ReturnType::new(VariableType::Logic, TIME_WIDTH, false)),
        ];
        for (name, ret) in builtins {
            table.insert(SysFuncSignature::new(name, ret));
        }
        table
    }

    /// Width given to `vpiSysFuncInt` entries
    pub const fn integer_width(&self) -> u32 {
        self.integer_width
    }

    /// Looks up `name` exactly; `None` means it is not a known system function
    pub fn lookup(&self, name: &str) -> Option<&SysFuncSignature> {
        self.entries.get(name)
    }

    /// The return type of `name`, or [`DEFAULT_RETURN`] for unknown functions
    pub fn return_type(&self, name: &str) -> ReturnType {
        self.lookup(name).map_or(DEFAULT_RETURN, |entry| entry.ret)
    }

    /// Adds or replaces an entry, returning the one it replaced
    pub fn insert(&mut self, signature: SysFuncSignature) -> Option<SysFuncSignature> {
        let replaced = self.entries.insert(signature.name.clone(), signature);
        if let Some(old) = &replaced {
            debug!(name = %old.name, "system function redefined");
        }
        replaced
    }

    /// Merges entries in order; later entries win over earlier ones
    ///
    /// Returns the number of distinct names among `entries`.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = SysFuncSignature>) -> usize {
        let mut names = IndexSet::new();
        for entry in entries {
            names.insert(entry.name.clone());
            self.insert(entry);
        }
        names.len()
    }

    /// Loads a table file and merges it into this table
    ///
    /// A missing file is not an error and yields [`LoadOutcome::Absent`].
    ///
    /// # Errors
    ///
    /// Returns `SysFuncTableError::Io` if the file exists but cannot be read,
    /// or `SysFuncTableError::Malformed` for the first bad record. In both
    /// cases the table is left unchanged.
    pub fn load_table(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, SysFuncTableError> {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "system function table not found");
                return Ok(LoadOutcome::Absent);
            }
            Err(source) => {
                return Err(SysFuncTableError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let entries = parse_table(&source, path, self.integer_width)?;
        let count = self.merge(entries);
        info!(path = %path.display(), count, "loaded system function table");
        Ok(LoadOutcome::Loaded { count })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-definition order
    pub fn iter(&self) -> impl Iterator<Item = &SysFuncSignature> {
        self.entries.values()
    }
}

impl Default for SysFuncTable {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_INTEGER_WIDTH)
    }
}
