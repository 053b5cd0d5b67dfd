//! Runtime values.

use std::fmt;
use std::rc::Rc;

use landru_ir::{Constant, StringInterner};

/// Opaque reference to a host-owned object (a sprite, a sound, a socket).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: &'static str,
    pub id: u64,
}

/// A value held by a variable or passed to a function.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Handle(Handle),
}

impl Value {
    /// Evaluate a non-atom constant. Atoms are variable references and
    /// must be resolved by the caller.
    pub fn from_literal(constant: Constant, interner: &StringInterner) -> Option<Self> {
        match constant {
            Constant::Atom(_) => None,
            Constant::Str(name) => Some(Value::string(interner.lookup(name))),
            Constant::Int(n) => Some(Value::Int(n)),
            Constant::Float(f) => Some(Value::Float(f)),
        }
    }

    #[inline]
    pub fn string(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Handle(h) => h.kind,
        }
    }

    /// Numeric view of an `Int` or `Float`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "script integers are promoted to floats on purpose"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => f.write_str(s),
            Value::Handle(h) => write!(f, "<{}#{}>", h.kind, h.id),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}
