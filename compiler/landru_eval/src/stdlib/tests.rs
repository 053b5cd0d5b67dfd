#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::buffer_handler;

fn call(registry: &LibraryRegistry, name: &str, args: &[Value]) -> Result<Value, ArityOrTypeError> {
    registry.function(name).unwrap()(args)
}

fn standard() -> LibraryRegistry {
    LibraryRegistry::standard(buffer_handler())
}

#[test]
fn test_standard_modules() {
    let registry = standard();
    assert_eq!(
        registry.modules().into_iter().collect::<Vec<_>>(),
        ["io", "math", "time"]
    );
}

#[test]
fn test_io_print_joins_arguments() {
    let print = buffer_handler();
    let registry = LibraryRegistry::standard(print.clone());
    let args = [Value::string("x ="), Value::Int(3), Value::Float(0.5)];
    assert_eq!(call(&registry, "io.print", &args).unwrap(), Value::Nil);
    call(&registry, "io.newline", &[]).unwrap();
    assert_eq!(print.output(), "x = 3 0.5\n\n");
}

#[test]
fn test_io_newline_takes_no_arguments() {
    let registry = standard();
    assert!(matches!(
        call(&registry, "io.newline", &[Value::Int(1)]),
        Err(ArityOrTypeError::Arity { got: 1, .. })
    ));
}

#[test]
fn test_math_int_and_float() {
    let registry = standard();
    let add = call(&registry, "math.add", &[Value::Int(1), Value::Int(2), Value::Int(3)]);
    assert_eq!(add.unwrap(), Value::Int(6));
    let mixed = call(&registry, "math.mul", &[Value::Int(2), Value::Float(1.5)]);
    assert_eq!(mixed.unwrap(), Value::Float(3.0));
    let sub = call(&registry, "math.sub", &[Value::Int(2), Value::Int(5)]);
    assert_eq!(sub.unwrap(), Value::Int(-3));
    let div = call(&registry, "math.div", &[Value::Int(7), Value::Int(2)]);
    assert_eq!(div.unwrap(), Value::Int(3));
    let fdiv = call(&registry, "math.div", &[Value::Float(7.0), Value::Int(2)]);
    assert_eq!(fdiv.unwrap(), Value::Float(3.5));
}

#[test]
fn test_math_errors() {
    let registry = standard();
    assert!(matches!(
        call(&registry, "math.div", &[Value::Int(1), Value::Int(0)]),
        Err(ArityOrTypeError::Type { .. })
    ));
    assert!(matches!(
        call(&registry, "math.add", &[Value::Int(i64::MAX), Value::Int(1)]),
        Err(ArityOrTypeError::Type { .. })
    ));
    assert!(matches!(
        call(&registry, "math.add", &[Value::Int(1), Value::string("2")]),
        Err(ArityOrTypeError::Type { got, .. }) if got == "string"
    ));
    assert!(matches!(
        call(&registry, "math.sub", &[Value::Int(1)]),
        Err(ArityOrTypeError::Arity { got: 1, .. })
    ));
    assert!(matches!(
        call(&registry, "math.max", &[]),
        Err(ArityOrTypeError::Arity { got: 0, .. })
    ));
}

#[test]
fn test_math_min_max_keep_argument() {
    let registry = standard();
    let args = [Value::Int(4), Value::Float(-1.5), Value::Int(9)];
    assert_eq!(call(&registry, "math.min", &args).unwrap(), Value::Float(-1.5));
    assert_eq!(call(&registry, "math.max", &args).unwrap(), Value::Int(9));
}

#[test]
fn test_math_constants() {
    let registry = standard();
    assert_eq!(
        registry.value("math.pi"),
        Some(&Value::Float(std::f64::consts::PI))
    );
    assert!(registry.value("math.tau").is_none());
}

#[test]
fn test_time_after() {
    let registry = standard();
    let arg = Value::Float(1.5);
    assert_eq!(
        registry.is_satisfied("time.after", &arg, Duration::from_secs(1)),
        Some(Ok(false))
    );
    assert_eq!(
        registry.is_satisfied("time.after", &arg, Duration::from_millis(1500)),
        Some(Ok(true))
    );
    assert!(matches!(
        registry.is_satisfied("time.after", &Value::string("soon"), Duration::ZERO),
        Some(Err(ArityOrTypeError::Type { .. }))
    ));
}

#[test]
fn test_time_millis() {
    let registry = standard();
    let ms = call(&registry, "time.millis", &[Value::Float(1.25)]);
    assert_eq!(ms.unwrap(), Value::Int(1250));
}
