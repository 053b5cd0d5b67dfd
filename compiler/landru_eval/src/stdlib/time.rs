use super::{expect_args, expect_number};
use crate::{LibraryRegistry, Value};

pub fn install(registry: &mut LibraryRegistry) {
    registry
        .register_condition("time.after", |arg, elapsed| {
            let secs = expect_number("time.after", arg)?;
            Ok(elapsed.as_secs_f64() >= secs)
        })
        .register_function("time.millis", |args| {
            expect_args("time.millis", args, 1)?;
            let secs = expect_number("time.millis", &args[0])?;
            Ok(Value::Int(millis(secs)))
        });
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "saturating float-to-int conversion is the intent"
)]
fn millis(secs: f64) -> i64 {
    (secs * 1000.0).round() as i64
}
