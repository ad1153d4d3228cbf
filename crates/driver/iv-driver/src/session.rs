//! The compilation session
//!
//! A [`Session`] owns every resolution service for one run of the compiler.
//! It is built once from a [`CompilerConfig`], handed by reference to the
//! parser and to elaboration, and consumed by [`Session::finish`] to produce
//! the end-of-run summary.

use crate::config::CompilerConfig;
use crate::error::{Diagnostic, SourceError};
use crate::summary::CompilationSummary;
use anyhow::{Context, Result};
use iv_generation::GenerationPolicy;
use iv_intern::{LexInterner, LexSymbol, MiscInterner, MiscSymbol};
use iv_library::{LibraryFiles, LibraryIndex, LibrarySearch, MissingModules};
use iv_sysfunc::{LoadOutcome, ReturnType, SysFuncSignature, SysFuncTable};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// How a source file was reached
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Named directly by the user
    Primary,
    /// Pulled in from a library directory
    Library,
}

/// A source file the lexer has switched to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Interned file name
    pub path: MiscSymbol,
    /// Whether modules in this file are library modules
    pub library: bool,
}

/// Answer to a request for a module definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleRequest {
    /// A library file defines the module
    Found {
        /// The defining file
        path: PathBuf,
        /// `true` the first time this file is handed out; the caller should
        /// parse it
        first_load: bool,
    },
    /// No library file defines the module; the miss was recorded
    Missing {
        /// How often this name has been missed so far
        count: usize,
    },
}

/// Resolution services for one compilation
#[derive(Debug)]
pub struct Session {
    config: CompilerConfig,
    policy: GenerationPolicy,
    lex_strings: LexInterner,
    misc_strings: MiscInterner,
    sys_funcs: SysFuncTable,
    library: RwLock<Arc<LibraryIndex>>,
    library_files: LibraryFiles,
    missing: MissingModules,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl Session {
    /// Sets up every service from `config`
    ///
    /// Loads the system function tables and scans the library directories.
    /// Unreadable directories and bad tables become diagnostics in the final
    /// summary rather than errors here.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration itself is invalid.
    pub fn start(config: CompilerConfig) -> Result<Self> {
        config.validate().context("invalid compiler configuration")?;
        let policy = config.generation_policy()?;
        info!(%policy, "starting compilation session");

        let mut diagnostics = Vec::new();

        let mut sys_funcs = SysFuncTable::with_defaults(config.integer_width);
        for path in config.sys_func_table_paths() {
            match sys_funcs.load_table(&path) {
                Ok(LoadOutcome::Loaded { count }) => {
                    debug!(path = %path.display(), count, "system function table");
                }
                Ok(LoadOutcome::Absent) => {
                    debug!(path = %path.display(), "system function table not found");
                }
                Err(err) => {
                    warn!(error = %err, "system function table not loaded");
                    diagnostics.push(Diagnostic::from(err));
                }
            }
        }

        let build = LibraryIndex::build(&config.library_search());
        info!(modules = build.index.module_count(), "library index built");
        diagnostics.extend(build.errors.into_iter().map(Diagnostic::from));

        Ok(Self {
            config,
            policy,
            lex_strings: LexInterner::new(),
            misc_strings: MiscInterner::new(),
            sys_funcs,
            library: RwLock::new(Arc::new(build.index)),
            library_files: LibraryFiles::new(),
            missing: MissingModules::new(),
            diagnostics: Mutex::new(diagnostics),
        })
    }

    /// The configuration the session was started with
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The generation policy in force
    pub const fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    /// Interner for identifiers and other lexical tokens
    pub const fn lex_strings(&self) -> &LexInterner {
        &self.lex_strings
    }

    /// Interner for file names and diagnostic text
    pub const fn misc_strings(&self) -> &MiscInterner {
        &self.misc_strings
    }

    /// The system function table
    pub const fn sys_funcs(&self) -> &SysFuncTable {
        &self.sys_funcs
    }

    /// The current library index
    ///
    /// The returned index stays consistent even if the index is rebuilt
    /// meanwhile.
    pub fn library_index(&self) -> Arc<LibraryIndex> {
        let index = self.library.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&index)
    }

    /// The library file record
    pub const fn library_files(&self) -> &LibraryFiles {
        &self.library_files
    }

    /// Records that the lexer switched to `path`
    ///
    /// Library files stay library files even if later named as primary.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NonUtf8Path` if `path` is not valid UTF-8. Nothing
    /// is recorded in that case.
    pub fn enter_source(
        &self,
        path: impl AsRef<Path>,
        origin: SourceOrigin,
    ) -> Result<SourceFile, SourceError> {
        let path = path.as_ref();
        let text = path.to_str().ok_or_else(|| SourceError::NonUtf8Path {
            path: path.to_path_buf(),
        })?;
        match origin {
            SourceOrigin::Primary => self.library_files.note_primary(path),
            SourceOrigin::Library => {
                self.library_files.mark_library(path);
            }
        }
        Ok(SourceFile {
            path: self.misc_strings.intern(text),
            library: self.library_files.classify(path),
        })
    }

    /// Looks for a library file defining module `name`
    ///
    /// A found file is marked as a library file. A miss is counted and makes
    /// the compilation fail at the end.
    ///
    /// # Panics
    ///
    /// Panics if `name` was not interned by [`Session::lex_strings`].
    pub fn request_module(&self, name: LexSymbol) -> ModuleRequest {
        let name = self.lex_strings.resolve(name);
        let index = self.library_index();
        if let Some(path) = index.resolve(name) {
            let first_load = self.library_files.mark_library(path);
            if first_load {
                debug!(module = name, file = %path.display(), "loading library module");
            }
            return ModuleRequest::Found {
                path: path.to_path_buf(),
                first_load,
            };
        }

        let count = self.missing.record_miss(name);
        debug!(module = name, count, "module not found");
        ModuleRequest::Missing { count }
    }

    /// The signature of system function `name`, if it is a known built-in
    ///
    /// # Panics
    ///
    /// Panics if `name` was not interned by [`Session::lex_strings`].
    pub fn sys_func(&self, name: LexSymbol) -> Option<&SysFuncSignature> {
        self.sys_funcs.lookup(self.lex_strings.resolve(name))
    }

    /// The result type of a call to `name`, with the default for unknown
    /// functions
    ///
    /// # Panics
    ///
    /// Panics if `name` was not interned by [`Session::lex_strings`].
    pub fn sys_func_return_type(&self, name: LexSymbol) -> ReturnType {
        self.sys_funcs.return_type(self.lex_strings.resolve(name))
    }

    /// Rebuilds the library index for a new search configuration
    ///
    /// The new index is built completely before it replaces the old one.
    /// Returns the number of modules indexed.
    pub fn rebuild_library_index(&self, search: &LibrarySearch) -> usize {
        let build = LibraryIndex::build(search);
        let modules = build.index.module_count();
        if !build.errors.is_empty() {
            self.diagnostics
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(build.errors.into_iter().map(Diagnostic::from));
        }

        let fresh = Arc::new(build.index);
        *self.library.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        info!(modules, "library index rebuilt");
        modules
    }

    /// Number of startup problems recorded so far
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Ends the session and gathers everything worth reporting
    pub fn finish(self) -> CompilationSummary {
        let summary = CompilationSummary {
            missing: self.missing.report(),
            diagnostics: self
                .diagnostics
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            library_files: self.library_files.library_paths(),
        };
        info!(
            missing = summary.missing.modules().len(),
            diagnostics = summary.diagnostics.len(),
            "compilation session finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iv_generation::Generation;
    use std::fs;
    use tempfile::TempDir;

    fn session_with_library(files: &[&str]) -> (TempDir, Session) {
        let root = TempDir::new().unwrap();
        for file in files {
            fs::write(root.path().join(file), "module m; endmodule\n").unwrap();
        }
        let config = CompilerConfig {
            library_dirs: vec![root.path().to_path_buf()],
            ..CompilerConfig::default()
        };
        let session = Session::start(config).unwrap();
        (root, session)
    }

    #[test]
    fn test_found_module_marks_library_file() {
        let (root, session) = session_with_library(&["and2.v"]);
        let name = session.lex_strings().intern("and2");

        let expected = root.path().join("and2.v");
        assert_eq!(
            session.request_module(name),
            ModuleRequest::Found {
                path: expected.clone(),
                first_load: true,
            }
        );
        assert_eq!(
            session.request_module(name),
            ModuleRequest::Found {
                path: expected.clone(),
                first_load: false,
            }
        );
        assert!(session.library_files().classify(&expected));
    }

    #[test]
    fn test_missing_module_fails_run() {
        let (_root, session) = session_with_library(&[]);
        let name = session.lex_strings().intern("bar");
        assert_eq!(session.request_module(name), ModuleRequest::Missing { count: 1 });
        assert_eq!(session.request_module(name), ModuleRequest::Missing { count: 2 });

        let summary = session.finish();
        assert!(!summary.succeeded());
        assert_eq!(summary.missing.pairs(), [("bar", 2)]);
    }

    #[test]
    fn test_sys_func_lookup_through_session() {
        let (_root, session) = session_with_library(&[]);
        let time = session.lex_strings().intern("$time");
        let custom = session.lex_strings().intern("$custom");
        assert_eq!(session.sys_func(time).unwrap().ret.width, 64);
        assert!(session.sys_func(custom).is_none());
        assert_eq!(session.sys_func_return_type(custom).width, 32);
    }

    #[test]
    fn test_enter_source() {
        let (_root, session) = session_with_library(&[]);
        let top = session.enter_source("top.v", SourceOrigin::Primary).unwrap();
        let cell = session
            .enter_source("lib/cell.v", SourceOrigin::Library)
            .unwrap();
        assert!(!top.library);
        assert!(cell.library);
        assert_eq!(session.misc_strings().resolve(top.path), "top.v");

        let again = session
            .enter_source("lib/cell.v", SourceOrigin::Primary)
            .unwrap();
        assert!(again.library);
        assert_eq!(again.path, cell.path);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_root, session) = session_with_library(&[]);
        let library = Path::new(OsStr::from_bytes(b"lib/\xffcell.v"));
        let primary = Path::new(OsStr::from_bytes(b"lib/\xfecell.v"));

        let requests = [
            (library, SourceOrigin::Library),
            (primary, SourceOrigin::Primary),
        ];
        for (path, origin) in requests {
            let err = session.enter_source(path, origin).unwrap_err();
            assert!(matches!(err, SourceError::NonUtf8Path { path: ref bad } if bad == path));
        }
        assert!(!session.library_files().is_known(library));
        assert!(!session.library_files().is_known(primary));
        assert!(session.misc_strings().is_empty());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let config = CompilerConfig {
            flags: vec!["xtypes-please".to_owned()],
            ..CompilerConfig::default()
        };
        assert!(Session::start(config).is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let config = CompilerConfig {
            generation: Generation::Verilog1995,
            ..CompilerConfig::default()
        };
        let session = Session::start(config).unwrap();
        assert_eq!(session.policy().current_level(), Generation::Verilog1995);
        assert!(!session.policy().vendor_types_enabled());
    }
}
