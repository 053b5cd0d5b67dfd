//! Host-provided libraries: native functions, module values and event
//! conditions, keyed by fully dotted names (`io.print`, `math.pi`,
//! `time.after`).
//!
//! The registry is independent of any program. A program only sees the
//! modules it `require`s; that check happens in the engine.

use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::{ArityOrTypeError, Value};

/// A native function. Receives evaluated arguments.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, ArityOrTypeError>>;

/// An event condition. Receives the handler's argument and the time
/// elapsed since the handler was registered.
pub type ConditionFn = Rc<dyn Fn(&Value, Duration) -> Result<bool, ArityOrTypeError>>;

/// Module prefix of a dotted name: `io` for `io.print`.
#[inline]
pub fn module_of(name: &str) -> Option<&str> {
    name.split_once('.').map(|(module, _)| module)
}

#[derive(Clone, Default)]
pub struct LibraryRegistry {
    functions: FxHashMap<String, NativeFn>,
    values: FxHashMap<String, Value>,
    conditions: FxHashMap<String, ConditionFn>,
}

impl LibraryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_function(
        &mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Result<Value, ArityOrTypeError> + 'static,
    ) -> &mut Self {
        self.functions.insert(name.to_string(), Rc::new(f));
        self
    }

    pub fn register_value(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn register_condition(
        &mut self,
        name: &str,
        f: impl Fn(&Value, Duration) -> Result<bool, ArityOrTypeError> + 'static,
    ) -> &mut Self {
        self.conditions.insert(name.to_string(), Rc::new(f));
        self
    }

    #[inline]
    pub fn function(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(name)
    }

    #[inline]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[inline]
    pub fn condition(&self, name: &str) -> Option<&ConditionFn> {
        self.conditions.get(name)
    }

    /// Poll a condition. `None` if no condition of that kind exists.
    pub fn is_satisfied(
        &self,
        kind: &str,
        arg: &Value,
        elapsed: Duration,
    ) -> Option<Result<bool, ArityOrTypeError>> {
        self.condition(kind).map(|f| f(arg, elapsed))
    }

    /// Every module prefix with at least one registered entry.
    pub fn modules(&self) -> BTreeSet<&str> {
        self.functions
            .keys()
            .chain(self.values.keys())
            .chain(self.conditions.keys())
            .filter_map(|name| module_of(name))
            .collect()
    }
}

impl std::fmt::Debug for LibraryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        let mut conditions: Vec<_> = self.conditions.keys().collect();
        conditions.sort();
        f.debug_struct("LibraryRegistry")
            .field("functions", &functions)
            .field("values", &self.values.len())
            .field("conditions", &conditions)
            .finish()
    }
}
