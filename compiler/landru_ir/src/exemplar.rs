//! Machine exemplars: the immutable templates produced by compilation.
//!
//! Exemplars live in an `ExemplarArena` and refer to one another by
//! `ExemplarId`. Ownership is a tree: every exemplar except the Root is
//! filed in exactly one parent's `nested_machines`, `nested_functions`, or
//! `event_handlers`, or referenced by exactly one `ValueSource::Nested`.

use std::fmt;

use rustc_hash::FxHashMap;

use super::{Constant, Instruction, Name};

/// Index into the exemplar arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ExemplarId(u32);

impl ExemplarId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExemplarId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExemplarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExemplarId({})", self.0)
    }
}

impl fmt::Display for ExemplarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// What an exemplar is a template for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExemplarKind {
    Root,
    Machine,
    State,
    /// Event handler; `name` is the condition kind (`time.after`).
    On,
    /// `defun` (pure) or `defum` (side-effecting) function.
    Function,
    /// Inline value of a `set`/`shared`; may have side effects.
    Monad,
    /// Inline call argument.
    List,
}

impl ExemplarKind {
    /// The keyword that opens this kind of exemplar, if any.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ExemplarKind::Machine => Some("machine"),
            ExemplarKind::State => Some("state"),
            ExemplarKind::On => Some("on"),
            ExemplarKind::Function => Some("defun"),
            ExemplarKind::Root | ExemplarKind::Monad | ExemplarKind::List => None,
        }
    }
}

impl fmt::Display for ExemplarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExemplarKind::Root => "root",
            ExemplarKind::Machine => "machine",
            ExemplarKind::State => "state",
            ExemplarKind::On => "on",
            ExemplarKind::Function => "function",
            ExemplarKind::Monad => "monad",
            ExemplarKind::List => "list",
        };
        f.write_str(s)
    }
}

/// A compiled template.
#[derive(Clone, Debug, PartialEq)]
pub struct Exemplar {
    pub name: Name,
    pub kind: ExemplarKind,
    /// Non-owning back-reference. `None` only for the Root.
    pub parent: Option<ExemplarId>,
    pub instructions: Vec<Instruction>,
    /// Child machines and child states, keyed by name.
    pub nested_machines: FxHashMap<Name, ExemplarId>,
    /// `defun`/`defum` templates, keyed by name.
    pub nested_functions: FxHashMap<Name, ExemplarId>,
    /// `on` blocks in source order.
    pub event_handlers: Vec<ExemplarId>,
    /// Event-condition parameter; only set for `On`.
    pub condition_arg: Option<Constant>,
    /// Parameter names; only set for `Function`.
    pub params: Vec<Name>,
    /// `true` for `defun`. Pure functions may not launch or write outer scopes.
    pub pure: bool,
    /// Source offset of the opening bracket.
    pub offset: u32,
}

impl Exemplar {
    pub fn new(name: Name, kind: ExemplarKind, offset: u32) -> Self {
        Exemplar {
            name,
            kind,
            parent: None,
            instructions: Vec::new(),
            nested_machines: FxHashMap::default(),
            nested_functions: FxHashMap::default(),
            event_handlers: Vec::new(),
            condition_arg: None,
            params: Vec::new(),
            pure: false,
            offset,
        }
    }
}

/// Arena owning every exemplar of a program.
#[derive(Clone, Debug, Default)]
pub struct ExemplarArena {
    exemplars: Vec<Exemplar>,
}

impl ExemplarArena {
    pub fn new() -> Self {
        ExemplarArena {
            exemplars: Vec::new(),
        }
    }

    /// Store an exemplar and return its id.
    pub fn alloc(&mut self, exemplar: Exemplar) -> ExemplarId {
        let id = ExemplarId::new(
            u32::try_from(self.exemplars.len()).unwrap_or_else(|_| panic!("exemplar arena overflow")),
        );
        self.exemplars.push(exemplar);
        id
    }

    /// Get an exemplar.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: ExemplarId) -> &Exemplar {
        &self.exemplars[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: ExemplarId) -> &mut Exemplar {
        &mut self.exemplars[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.exemplars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty()
    }

    /// Child exemplar of `kind` named `name` directly inside `owner`.
    pub fn nested_of_kind(
        &self,
        owner: ExemplarId,
        name: Name,
        kind: ExemplarKind,
    ) -> Option<ExemplarId> {
        let id = *self.get(owner).nested_machines.get(&name)?;
        (self.get(id).kind == kind).then_some(id)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: ExemplarId) -> impl Iterator<Item = ExemplarId> + '_ {
        std::iter::successors(self.get(id).parent, move |&p| self.get(p).parent)
    }
}
