//! Compiler configuration
//!
//! Everything the resolution services need from the outside world, read
//! once at startup. The same settings can come from a TOML file:
//!
//! ```toml
//! library_dirs = ["cells", "/opt/vendor/lib"]
//! library_suffixes = [".v", ".vl"]
//! case_sensitive = false
//! generation = "2001"
//! flags = ["no-specify"]
//! sys_func_tables = ["system.sft"]
//! integer_width = 32
//!
//! [warnings]
//! implicit = true
//! ```

use crate::error::ConfigError;
use iv_generation::{FeatureToggles, Generation, GenerationPolicy};
use iv_library::LibrarySearch;
use iv_sysfunc::DEFAULT_INTEGER_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional warnings, all off by default
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarningFlags {
    /// Implicit net declarations
    pub implicit: bool,
    /// Implicit net declarations are errors
    pub implicit_error: bool,
    /// Timescales inherited across files
    pub timescale: bool,
    /// Legal but questionable port bindings
    pub portbinding: bool,
}

impl WarningFlags {
    /// Turns on a warning class by name: `implicit`, `implicit-error`,
    /// `portbind`, `timescale` or `all`
    ///
    /// `implicit-error` also turns on `implicit`. `all` leaves it alone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownWarning` for any other name.
    pub fn enable(&mut self, class: &str) -> Result<(), ConfigError> {
        match class {
            "all" => {
                self.implicit = true;
                self.portbinding = true;
                self.timescale = true;
            }
            "implicit" => self.implicit = true,
            "implicit-error" => {
                self.implicit = true;
                self.implicit_error = true;
            }
            "portbind" => self.portbinding = true,
            "timescale" => self.timescale = true,
            other => return Err(ConfigError::UnknownWarning(other.to_owned())),
        }
        Ok(())
    }
}

/// Internal tracing switches for compiler developers
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugFlags {
    /// Trace scope creation
    pub scopes: bool,
    /// Trace constant expression evaluation
    pub eval_tree: bool,
    /// Trace elaboration
    pub elaborate: bool,
    /// Trace synthesis
    pub synth2: bool,
}

/// All startup settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Directory that relative paths are taken from
    pub base_dir: Option<PathBuf>,
    /// Library directories, highest priority first
    pub library_dirs: Vec<PathBuf>,
    /// Library file suffixes, highest priority first
    pub library_suffixes: Vec<String>,
    /// Whether module names must match library file names exactly
    pub case_sensitive: bool,
    /// Language generation
    pub generation: Generation,
    /// Feature toggles before `flags` are applied
    pub features: FeatureToggles,
    /// Generation flags applied in order, e.g. `2001`, `no-xtypes`
    pub flags: Vec<String>,
    /// Extra system function tables, loaded in order
    pub sys_func_tables: Vec<PathBuf>,
    /// Width of `integer` variables
    pub integer_width: u32,
    /// Optional warnings
    pub warnings: WarningFlags,
    /// Developer tracing
    pub debug: DebugFlags,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            library_dirs: Vec::new(),
            library_suffixes: vec![".v".to_owned()],
            case_sensitive: true,
            generation: Generation::default(),
            features: FeatureToggles::default(),
            flags: Vec::new(),
            sys_func_tables: Vec::new(),
            integer_width: DEFAULT_INTEGER_WIDTH,
            warnings: WarningFlags::default(),
            debug: DebugFlags::default(),
        }
    }
}

impl CompilerConfig {
    /// Parses a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Reads a configuration file
    ///
    /// Relative paths inside the file are taken relative to the file's
    /// directory unless `base_dir` says otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;

        let file_dir = path.parent().unwrap_or_else(|| Path::new(""));
        config.base_dir = Some(match config.base_dir.take() {
            Some(base) => file_dir.join(base),
            None => file_dir.to_path_buf(),
        });
        Ok(config)
    }

    /// Checks values that TOML alone cannot rule out
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.integer_width == 0 {
            return Err(ConfigError::InvalidIntegerWidth(self.integer_width));
        }
        if let Some(suffix) = self.library_suffixes.iter().find(|suffix| suffix.is_empty()) {
            return Err(ConfigError::InvalidSuffix(suffix.clone()));
        }
        self.generation_policy().map(|_| ())
    }

    /// The generation policy these settings describe
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Generation` if a flag is not recognised.
    pub fn generation_policy(&self) -> Result<GenerationPolicy, ConfigError> {
        let mut builder = GenerationPolicy::builder()
            .level(self.generation)
            .toggles(self.features);
        for flag in &self.flags {
            builder = builder.apply_flag(flag)?;
        }
        Ok(builder.build())
    }

    /// The library search these settings describe, with paths made absolute
    /// against `base_dir`
    pub fn library_search(&self) -> LibrarySearch {
        LibrarySearch::new(
            self.library_dirs.iter().map(|dir| self.resolve_path(dir)),
            self.library_suffixes.iter().cloned(),
            self.case_sensitive,
        )
    }

    /// System function table paths made absolute against `base_dir`
    pub fn sys_func_table_paths(&self) -> Vec<PathBuf> {
        self.sys_func_tables
            .iter()
            .map(|path| self.resolve_path(path))
            .collect()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iv_generation::Feature;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.library_suffixes, [".v"]);
        assert!(config.case_sensitive);
        assert_eq!(config.integer_width, 32);
        assert_eq!(config.generation, Generation::Verilog2001X);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            CompilerConfig::from_toml_str("").unwrap(),
            CompilerConfig::default()
        );
    }

    #[test]
    fn test_full_toml() {
        let config = CompilerConfig::from_toml_str(
            r#"
            base_dir = "/work"
            library_dirs = ["cells", "/opt/lib"]
            library_suffixes = [".v", ".vl"]
            case_sensitive = false
            generation = "2001"
            flags = ["no-specify"]
            sys_func_tables = ["extra.sft"]
            integer_width = 64

            [features]
            xtypes = false

            [warnings]
            implicit = true

            [debug]
            elaborate = true
            "#,
        )
        .unwrap();

        let search = config.library_search();
        assert_eq!(
            search.directories,
            [PathBuf::from("/work/cells"), PathBuf::from("/opt/lib")]
        );
        assert_eq!(search.suffixes, [".v", ".vl"]);
        assert!(!search.case_sensitive);
        assert_eq!(config.sys_func_table_paths(), [PathBuf::from("/work/extra.sft")]);

        let policy = config.generation_policy().unwrap();
        assert_eq!(policy.current_level(), Generation::Verilog2001);
        assert!(!policy.is_toggle_set(Feature::VendorTypes));
        assert!(!policy.specify_blocks_enabled());
        assert!(policy.io_range_error_enabled());

        assert!(config.warnings.implicit);
        assert!(!config.warnings.timescale);
        assert!(config.debug.elaborate);
        assert_eq!(config.integer_width, 64);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CompilerConfig::from_toml_str("libary_dirs = []").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn test_bad_generation_flag() {
        let config = CompilerConfig {
            flags: vec!["2005".to_owned()],
            ..CompilerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Generation(_))
        ));
    }

    #[test]
    fn test_zero_integer_width_rejected() {
        let config = CompilerConfig {
            integer_width: 0,
            ..CompilerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIntegerWidth(0))
        ));
    }

    #[test]
    fn test_warning_classes() {
        let mut warnings = WarningFlags::default();
        warnings.enable("portbind").unwrap();
        assert!(warnings.portbinding);
        assert!(!warnings.implicit);
        warnings.enable("all").unwrap();
        assert!(warnings.implicit && warnings.timescale);
        assert!(!warnings.implicit_error);
        assert!(matches!(
            warnings.enable("everything"),
            Err(ConfigError::UnknownWarning(_))
        ));
    }

    #[test]
    fn test_implicit_error_class() {
        let mut warnings = WarningFlags::default();
        warnings.enable("implicit-error").unwrap();
        assert!(warnings.implicit_error);
        assert!(warnings.implicit);
        assert!(!warnings.portbinding);
    }
}
