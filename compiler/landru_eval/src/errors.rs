//! Runtime error types and their constructors.
//!
//! A runtime error is always fatal to the instance that raised it and to
//! nothing else: the engine force-retires the instance and hands the host
//! an [`InstanceFault`].

use std::fmt;

use thiserror::Error;

use crate::InstanceId;

/// What kind of name failed to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    Variable,
    Function,
    State,
    Machine,
    Condition,
    Module,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NameKind::Variable => "variable",
            NameKind::Function => "function",
            NameKind::State => "state",
            NameKind::Machine => "machine",
            NameKind::Condition => "condition",
            NameKind::Module => "module",
        };
        f.write_str(s)
    }
}

/// A name did not resolve through any scope or registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("undefined {kind} `{name}`")]
pub struct NameError {
    pub kind: NameKind,
    pub name: String,
}

/// A function rejected its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArityOrTypeError {
    #[error("`{function}` expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },
    #[error("`{function}` expects {expected}, got {got}")]
    Type {
        function: String,
        expected: String,
        got: String,
    },
}

/// Anything that can stop an instance mid-run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    ArityOrType(#[from] ArityOrTypeError),
    #[error("call depth exceeded {depth}")]
    RecursionLimit { depth: usize },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A runtime error attributed to the instance that raised it.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("machine `{machine}` ({instance}) faulted: {error}")]
pub struct InstanceFault {
    pub instance: InstanceId,
    pub machine: String,
    #[source]
    pub error: RuntimeError,
}

// Name errors

#[cold]
pub fn undefined(kind: NameKind, name: &str) -> NameError {
    NameError {
        kind,
        name: name.to_string(),
    }
}

#[cold]
pub fn undefined_variable(name: &str) -> NameError {
    undefined(NameKind::Variable, name)
}

#[cold]
pub fn undefined_function(name: &str) -> NameError {
    undefined(NameKind::Function, name)
}

#[cold]
pub fn undefined_state(name: &str) -> NameError {
    undefined(NameKind::State, name)
}

#[cold]
pub fn undefined_machine(name: &str) -> NameError {
    undefined(NameKind::Machine, name)
}

#[cold]
pub fn undefined_condition(name: &str) -> NameError {
    undefined(NameKind::Condition, name)
}

/// The module prefix of a dotted name was never `require`d.
#[cold]
pub fn module_not_required(module: &str) -> NameError {
    undefined(NameKind::Module, module)
}

// Arity and type errors

#[cold]
pub fn wrong_arg_count(function: &str, expected: impl fmt::Display, got: usize) -> ArityOrTypeError {
    ArityOrTypeError::Arity {
        function: function.to_string(),
        expected: expected.to_string(),
        got,
    }
}

#[cold]
pub fn wrong_arg_type(function: &str, expected: &str, got: &str) -> ArityOrTypeError {
    ArityOrTypeError::Type {
        function: function.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> RuntimeError {
    RuntimeError::RecursionLimit { depth }
}
