//! Interned tile, tile-type, and wire names.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A name interned by an [`Interner`], stored as its `u32` slot.
///
/// Fabric ids resolve to `Ident`s rather than strings, so comparing two wire
/// names during a search is an integer compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Wraps a raw slot index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// The raw slot index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: every `u32` fits in a `usize` on supported targets, and
// `try_from_usize` refuses indices above `u32::MAX`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Name table of one fabric model.
///
/// A `FabricBuilder` interns every name while the device is assembled;
/// afterwards routing jobs only look names up, concurrently.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, reusing the existing slot for a name seen before.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks `s` up without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// The name behind `ident`.
    ///
    /// # Panics
    ///
    /// Panics if `ident` came from a different table.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` before the first name is interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_shared_across_tiles_intern_once() {
        let interner = Interner::new();
        assert!(interner.is_empty());
        let a = interner.get_or_intern("NN6BEG0");
        let b = interner.get_or_intern("NN6BEG0");
        let c = interner.get_or_intern("INT_X0Y0");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.resolve(c), "INT_X0Y0");
    }

    #[test]
    fn lookup_misses_unknown_wire() {
        let interner = Interner::new();
        assert_eq!(interner.get("EE2END1"), None);
        let id = interner.get_or_intern("EE2END1");
        assert_eq!(interner.get("EE2END1"), Some(id));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn ident_serializes_as_its_slot() {
        let id = Ident::from_raw(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: Ident = serde_json::from_str("42").unwrap();
        assert_eq!(back.as_raw(), 42);
    }
}
