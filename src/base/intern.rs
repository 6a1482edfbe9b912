//! String interning for declaration names.
//!
//! Every name that enters a symbol table is interned once, so scope maps key
//! on a 4-byte [`Name`] handle instead of a string and name equality is a
//! `u32` compare.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// An interned identifier name.
///
/// Handles are only comparable when produced by the same [`Interner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Deduplicating store of identifier strings.
///
/// Thread-safe via internal locking: interning during a build and read-only
/// lookups from concurrent resolve queries may overlap freely.
#[derive(Default)]
pub struct Interner {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    map: FxHashMap<SmolStr, u32>,
    strings: Vec<SmolStr>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its `Name` handle.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path under the read lock
        {
            let inner = self.inner.read();
            if let Some(&index) = inner.map.get(s) {
                return Name::from_raw(index);
            }
        }

        let mut inner = self.inner.write();
        // Double-check after acquiring the write lock
        if let Some(&index) = inner.map.get(s) {
            return Name::from_raw(index);
        }

        let smol = SmolStr::new(s);
        let index = inner.strings.len() as u32;
        inner.strings.push(smol.clone());
        inner.map.insert(smol, index);
        Name::from_raw(index)
    }

    /// Look up an already-interned string without inserting.
    ///
    /// Resolution uses this for reference names: a name that was never
    /// interned cannot match any declaration.
    pub fn find(&self, s: &str) -> Option<Name> {
        self.inner.read().map.get(s).map(|&i| Name::from_raw(i))
    }

    /// Get the string for a `Name`.
    ///
    /// # Panics
    /// Panics if the `Name` came from a different interner.
    pub fn text(&self, name: Name) -> SmolStr {
        self.inner.read().strings[name.0 as usize].clone()
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("count", &self.len())
            .finish()
    }
}
