//! Modules that elaboration asked for but nothing defined

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared counter of unresolved module names
///
/// Safe to update from several elaboration workers at once. Clones share
/// the same counts.
#[derive(Clone, Debug, Default)]
pub struct MissingModules {
    inner: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl MissingModules {
    /// Creates an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more failed lookup of `name`, returning the new count
    pub fn record_miss(&self, name: &str) -> usize {
        // Counts only ever grow, so a poisoned lock still holds usable data
        let mut counts = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let count = counts.entry(name.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

    /// How often `name` was missed so far
    pub fn count(&self, name: &str) -> usize {
        let counts = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        counts.get(name).copied().unwrap_or(0)
    }

    /// Whether nothing has been missed
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Snapshot of every missing module, sorted by name
    pub fn report(&self) -> MissingReport {
        let counts = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        MissingReport {
            modules: counts
                .iter()
                .map(|(name, &count)| MissingModule {
                    name: name.clone(),
                    count,
                })
                .collect(),
        }
    }
}

/// One unresolved module name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingModule {
    /// Module name as requested
    pub name: String,
    /// Number of failed lookups
    pub count: usize,
}

/// End-of-run list of missing modules, sorted by name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissingReport {
    modules: Vec<MissingModule>,
}

impl MissingReport {
    /// The missing modules
    pub fn modules(&self) -> &[MissingModule] {
        &self.modules
    }

    /// `(name, count)` pairs
    pub fn pairs(&self) -> Vec<(&str, usize)> {
        self.modules
            .iter()
            .map(|module| (module.name.as_str(), module.count))
            .collect()
    }

    /// Whether no module was missing
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Failed lookups across all names
    pub fn total_misses(&self) -> usize {
        self.modules.iter().map(|module| module.count).sum()
    }
}

impl fmt::Display for MissingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modules.is_empty() {
            return Ok(());
        }
        writeln!(f, "*** These modules were missing:")?;
        for module in &self.modules {
            writeln!(f, "        {} referenced {} times.", module.name, module.count)?;
        }
        writeln!(f, "***")
    }
}
