//! Arithmetic over ints and floats. Int-only operands stay ints; any
//! float operand promotes the result to a float.

use std::f64::consts;

use super::{expect_args, expect_number};
use crate::errors::{wrong_arg_count, wrong_arg_type};
use crate::{ArityOrTypeError, LibraryRegistry, Value};

type IntOp = fn(i64, i64) -> Option<i64>;
type FloatOp = fn(f64, f64) -> f64;
type Prefer = fn(f64, f64) -> bool;

pub fn install(registry: &mut LibraryRegistry) {
    registry
        .register_function("math.add", |args| {
            fold("math.add", args, i64::checked_add, |a, b| a + b)
        })
        .register_function("math.mul", |args| {
            fold("math.mul", args, i64::checked_mul, |a, b| a * b)
        })
        .register_function("math.sub", |args| {
            expect_args("math.sub", args, 2)?;
            fold("math.sub", args, i64::checked_sub, |a, b| a - b)
        })
        .register_function("math.div", |args| {
            expect_args("math.div", args, 2)?;
            if args[1] == Value::Int(0) {
                return Err(wrong_arg_type("math.div", "a non-zero divisor", "0"));
            }
            fold("math.div", args, i64::checked_div, |a, b| a / b)
        })
        .register_function("math.min", |args| pick("math.min", args, |best, n| n < best))
        .register_function("math.max", |args| pick("math.max", args, |best, n| n > best))
        .register_value("math.pi", consts::PI)
        .register_value("math.e", consts::E);
}

/// Left fold over at least one numeric argument.
fn fold(
    function: &str,
    args: &[Value],
    int_op: IntOp,
    float_op: FloatOp,
) -> Result<Value, ArityOrTypeError> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| wrong_arg_count(function, "at least 1", 0))?;
    expect_number(function, first)?;
    rest.iter().try_fold(first.clone(), |acc, arg| match (&acc, arg) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b).map(Value::Int).ok_or_else(|| {
            wrong_arg_type(function, "a result within integer range", "an overflow")
        }),
        _ => Ok(Value::Float(float_op(
            expect_number(function, &acc)?,
            expect_number(function, arg)?,
        ))),
    })
}

/// The first argument that `prefer` ranks above every other.
fn pick(function: &str, args: &[Value], prefer: Prefer) -> Result<Value, ArityOrTypeError> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| wrong_arg_count(function, "at least 1", 0))?;
    let mut best = (expect_number(function, first)?, first);
    for arg in rest {
        let n = expect_number(function, arg)?;
        if prefer(best.0, n) {
            best = (n, arg);
        }
    }
    Ok(best.1.clone())
}
