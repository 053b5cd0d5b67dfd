//! The output of a successful compile.

use super::{ExemplarArena, ExemplarId, Name, StringInterner};

/// A compiled program: the exemplar tree plus everything needed to read it.
#[derive(Clone, Debug)]
pub struct Program {
    pub arena: ExemplarArena,
    pub root: ExemplarId,
    pub interner: StringInterner,
    /// Libraries named by `(require ...)`, in first-seen order, deduplicated.
    pub required_libraries: Vec<Name>,
}

impl Program {
    /// Resolve a name through the program's interner.
    #[inline]
    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Iterate required library names as strings.
    pub fn required_library_names(&self) -> impl Iterator<Item = &str> {
        self.required_libraries
            .iter()
            .map(|&n| self.interner.lookup(n))
    }

    /// Top-level machine exemplar by name.
    pub fn machine(&self, name: &str) -> Option<ExemplarId> {
        let name = self.interner.get(name)?;
        self.arena
            .nested_of_kind(self.root, name, crate::ExemplarKind::Machine)
    }
}
