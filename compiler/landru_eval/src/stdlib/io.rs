use super::expect_args;
use crate::{LibraryRegistry, SharedPrintHandler, Value};

pub fn install(registry: &mut LibraryRegistry, print: SharedPrintHandler) {
    let out = print.clone();
    registry.register_function("io.print", move |args| {
        let line: Vec<String> = args.iter().map(ToString::to_string).collect();
        out.println(&line.join(" "));
        Ok(Value::Nil)
    });
    registry.register_function("io.newline", move |args| {
        expect_args("io.newline", args, 0)?;
        print.println("");
        Ok(Value::Nil)
    });
}
