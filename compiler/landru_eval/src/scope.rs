//! Local contexts: one per active state and one per script function call.
//!
//! Functions and states visible from a context are not copied into it;
//! the engine finds them by walking the exemplar tree from the context's
//! exemplar.

use std::time::Duration;

use landru_ir::{ExemplarId, Name};
use rustc_hash::FxHashMap;

use crate::Value;

/// What opened a context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContextKind {
    State,
    /// A script function call. A pure frame keeps every `set` local.
    Frame { pure: bool },
}

/// An `on` handler waiting for its condition.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingCallback {
    /// The `On` exemplar whose instructions run when the condition holds.
    pub handler: ExemplarId,
    /// Condition kind, e.g. `time.after`.
    pub condition: Name,
    pub arg: Value,
    /// Clock reading when the handler was registered.
    pub registered_at: Duration,
}

#[derive(Clone, Debug)]
pub struct LocalContext {
    /// State or function exemplar.
    pub exemplar: ExemplarId,
    pub kind: ContextKind,
    pub vars: FxHashMap<Name, Value>,
    /// Registration order.
    pub callbacks: Vec<PendingCallback>,
}

impl LocalContext {
    pub fn state(exemplar: ExemplarId) -> Self {
        Self::with_kind(exemplar, ContextKind::State)
    }

    pub fn frame(exemplar: ExemplarId, pure: bool) -> Self {
        Self::with_kind(exemplar, ContextKind::Frame { pure })
    }

    fn with_kind(exemplar: ExemplarId, kind: ContextKind) -> Self {
        LocalContext {
            exemplar,
            kind,
            vars: FxHashMap::default(),
            callbacks: Vec::new(),
        }
    }

    #[inline]
    pub fn is_frame(&self) -> bool {
        matches!(self.kind, ContextKind::Frame { .. })
    }

    #[inline]
    pub fn is_pure_frame(&self) -> bool {
        matches!(self.kind, ContextKind::Frame { pure: true })
    }
}
