//! String interning for symbols
//!
//! The compiler keeps two separate string heaps. Lexical symbols hold the
//! identifiers, keywords and system task names read by the lexer, and are
//! looked up constantly during elaboration. Miscellaneous strings hold
//! everything else that wants a stable handle (file paths, diagnostic text).
//!
//! Each heap hands out handles tagged with its domain, so a [`LexSymbol`] can
//! never be compared against a [`MiscSymbol`]:
//!
//! ```compile_fail
//! use iv_intern::{LexInterner, MiscInterner};
//!
//! let lex = LexInterner::new();
//! let misc = MiscInterner::new();
//! assert_eq!(lex.intern("top"), misc.intern("top"));
//! ```

use lasso::{Key, Spur, ThreadedRodeo};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Marker for an interning domain
pub trait Domain: Send + Sync + 'static {
    /// Short name used when printing handles
    const NAME: &'static str;
}

/// Tokens produced by the lexer: identifiers, keywords, system names
#[derive(Debug)]
pub enum Lex {}

impl Domain for Lex {
    const NAME: &'static str = "lex";
}

/// Everything else: file paths, diagnostic text
#[derive(Debug)]
pub enum Misc {}

impl Domain for Misc {
    const NAME: &'static str = "misc";
}

/// Handle to a string interned in domain `D`
pub struct Symbol<D: Domain> {
    key: Spur,
    _domain: PhantomData<fn() -> D>,
}

/// Handle into the lexical string heap
pub type LexSymbol = Symbol<Lex>;
/// Handle into the miscellaneous string heap
pub type MiscSymbol = Symbol<Misc>;

impl<D: Domain> Symbol<D> {
    const fn new(key: Spur) -> Self {
        Self {
            key,
            _domain: PhantomData,
        }
    }
}

impl<D: Domain> Clone for Symbol<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Domain> Copy for Symbol<D> {}

impl<D: Domain> PartialEq for Symbol<D> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<D: Domain> Eq for Symbol<D> {}

impl<D: Domain> Hash for Symbol<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<D: Domain> PartialOrd for Symbol<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: Domain> Ord for Symbol<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.into_usize().cmp(&other.key.into_usize())
    }
}

impl<D: Domain> fmt::Debug for Symbol<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol<{}>({:?})", D::NAME, self.key)
    }
}

/// Thread-safe string interner for one domain
///
/// Clones share the same heap. Strings are never freed before the last clone
/// is dropped, so handles stay valid for the whole compilation.
pub struct Interner<D: Domain> {
    inner: Arc<ThreadedRodeo<Spur>>,
    _domain: PhantomData<fn() -> D>,
}

/// Interner for lexical tokens
pub type LexInterner = Interner<Lex>;
/// Interner for miscellaneous strings
pub type MiscInterner = Interner<Misc>;

impl<D: Domain> Interner<D> {
    /// Creates an empty interner
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
            _domain: PhantomData,
        }
    }

    /// Interns `text`, returning the existing handle if it was seen before
    ///
    /// # Panics
    ///
    /// Panics if the handle space is exhausted. Running out of interner
    /// storage is not a recoverable condition.
    pub fn intern(&self, text: &str) -> Symbol<D> {
        Symbol::new(self.inner.get_or_intern(text))
    }

    /// Looks up `text` without interning it
    pub fn get(&self, text: &str) -> Option<Symbol<D>> {
        self.inner.get(text).map(Symbol::new)
    }

    /// Returns the text behind `sym`
    ///
    /// # Panics
    ///
    /// Panics if `sym` was produced by a different interner.
    pub fn resolve(&self, sym: Symbol<D>) -> &str {
        self.inner.resolve(&sym.key)
    }

    /// Returns the text behind `sym`, or `None` if it belongs to another interner
    pub fn try_resolve(&self, sym: Symbol<D>) -> Option<&str> {
        self.inner.try_resolve(&sym.key)
    }

    /// Number of distinct strings interned so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<D: Domain> Clone for Interner<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _domain: PhantomData,
        }
    }
}

impl<D: Domain> Default for Interner<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Domain> fmt::Debug for Interner<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("domain", &D::NAME)
            .field("len", &self.len())
            .finish()
    }
}
