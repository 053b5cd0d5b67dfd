//! Single-threaded string interner.
//!
//! The tape, the compiled program, and the engine run on one thread, so the
//! interner is owned by value and handed along with the tape.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Name;

/// Maps strings to compact `Name`s and back.
#[derive(Clone)]
pub struct StringInterner {
    /// Map from string content to its `Name`.
    map: FxHashMap<Rc<str>, Name>,
    /// Storage indexed by `Name::index()`.
    strings: Vec<Rc<str>>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned as `Name::EMPTY`.
    pub fn new() -> Self {
        let empty: Rc<str> = Rc::from("");
        let mut map = FxHashMap::default();
        map.insert(Rc::clone(&empty), Name::EMPTY);
        StringInterner {
            map,
            strings: vec![empty],
        }
    }

    /// Intern a string, returning the existing `Name` if already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let name = Name::from_raw(
            u32::try_from(self.strings.len()).unwrap_or_else(|_| panic!("interner overflow")),
        );
        let stored: Rc<str> = Rc::from(s);
        self.map.insert(Rc::clone(&stored), name);
        self.strings.push(stored);
        name
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Resolve a `Name` back to its string.
    ///
    /// Names from a different interner resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.strings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
