//! Machine instances: the live, mutable side of a machine exemplar.

use std::fmt;

use landru_ir::{ExemplarId, Name};
use rustc_hash::FxHashMap;

use crate::scope::LocalContext;
use crate::shared::SharedKey;
use crate::Value;

/// Identifies a machine instance for the lifetime of an engine. Ids are
/// never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// The root instance, which runs the program's top-level forms.
    pub const ROOT: InstanceId = InstanceId(0);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        InstanceId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scheduling status of an instance.
///
/// ```text
/// Idle -> Ready -> Suspended <-> Ready
///                      \-> Retiring -> Gone
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstanceState {
    /// Created, nothing run yet.
    Idle,
    /// Running instructions this tick.
    Ready,
    /// Waiting for a queued transition or a pending callback.
    Suspended,
    /// Finished; removed at the end of the tick.
    Retiring,
    /// No longer exists.
    Gone,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Idle => "idle",
            InstanceState::Ready => "ready",
            InstanceState::Suspended => "suspended",
            InstanceState::Retiring => "retiring",
            InstanceState::Gone => "gone",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct MachineInstance {
    pub id: InstanceId,
    /// Machine exemplar this instance was launched from. The Root exemplar
    /// for the root instance.
    pub machine: ExemplarId,
    /// Instance whose code launched this one. Informational only.
    pub parent: Option<InstanceId>,
    pub state: InstanceState,
    /// Active states outermost first, plus function frames while calling.
    pub scope_stack: Vec<LocalContext>,
    /// Instance variables. Unused by the root, whose top-level `set`s are
    /// globals.
    pub vars: FxHashMap<Name, Value>,
    /// Shared cells this instance holds a reference on.
    pub shared_refs: Vec<SharedKey>,
    /// A `goto` is waiting for the next tick.
    pub transition_queued: bool,
    /// A state or handler run stopped at a `launch`; its state stays active.
    pub parked: bool,
    /// Nested script function calls currently active.
    pub call_depth: usize,
}

impl MachineInstance {
    pub fn new(id: InstanceId, machine: ExemplarId, parent: Option<InstanceId>) -> Self {
        MachineInstance {
            id,
            machine,
            parent,
            state: InstanceState::Idle,
            scope_stack: Vec::new(),
            vars: FxHashMap::default(),
            shared_refs: Vec::new(),
            transition_queued: false,
            parked: false,
            call_depth: 0,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    /// Innermost active state.
    pub fn current_state(&self) -> Option<ExemplarId> {
        self.scope_stack
            .iter()
            .rev()
            .find(|ctx| !ctx.is_frame())
            .map(|ctx| ctx.exemplar)
    }

    pub fn has_pending_callbacks(&self) -> bool {
        self.scope_stack.iter().any(|ctx| !ctx.callbacks.is_empty())
    }

    /// Decide what happens after a run: wait for more work, or retire.
    /// The root never retires.
    pub fn settle(&mut self) {
        if self.is_root()
            || self.transition_queued
            || self.parked
            || self.has_pending_callbacks()
        {
            self.state = InstanceState::Suspended;
        } else {
            self.scope_stack.clear();
            self.state = InstanceState::Retiring;
        }
    }

    /// Drop everything that could schedule more work.
    pub fn halt(&mut self) {
        self.scope_stack.clear();
        self.transition_queued = false;
        self.parked = false;
        self.call_depth = 0;
        if !self.is_root() {
            self.state = InstanceState::Retiring;
        }
    }
}
