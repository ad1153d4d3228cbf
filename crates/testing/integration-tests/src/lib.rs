//! Test infrastructure for library resolution scenarios.
//!
//! A [`LibraryFixture`] lays out library directories and table files in a
//! temporary directory and produces a matching [`CompilerConfig`].

use anyhow::Result;
use iv_driver::CompilerConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project with library directories and table files
#[derive(Debug)]
pub struct LibraryFixture {
    root: TempDir,
    library_dirs: Vec<PathBuf>,
    tables: Vec<PathBuf>,
}

impl LibraryFixture {
    /// Creates an empty fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
            library_dirs: Vec::new(),
            tables: Vec::new(),
        })
    }

    /// Root of the fixture
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Adds a library directory to the end of the search path
    ///
    /// The directory is created under the root; `files` are created empty
    /// apart from a module skeleton.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written
    pub fn library_dir(&mut self, name: &str, files: &[&str]) -> Result<PathBuf> {
        let dir = self.root.path().join(name);
        fs::create_dir_all(&dir)?;
        for file in files {
            let module = file.split('.').next().unwrap_or_default();
            fs::write(dir.join(file), format!("module {module};\nendmodule\n"))?;
        }
        self.library_dirs.push(dir.clone());
        Ok(dir)
    }

    /// Adds a search directory that does not exist
    pub fn missing_dir(&mut self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        self.library_dirs.push(dir.clone());
        dir
    }

    /// Writes a system function table and adds it to the load order
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn table(&mut self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.path().join(name);
        fs::write(&path, contents)?;
        self.tables.push(path.clone());
        Ok(path)
    }

    /// Adds a table path that does not exist to the load order
    pub fn absent_table(&mut self, name: &str) -> PathBuf {
        let path = self.root.path().join(name);
        self.tables.push(path.clone());
        path
    }

    /// A configuration using this fixture's directories and tables
    pub fn config(&self) -> CompilerConfig {
        CompilerConfig {
            library_dirs: self.library_dirs.clone(),
            sys_func_tables: self.tables.clone(),
            ..CompilerConfig::default()
        }
    }
}
