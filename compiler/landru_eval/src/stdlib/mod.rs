//! Standard libraries: `io`, `math` and `time`.
//!
//! Each library is a plain function that installs its entries into a
//! registry. A program still has to `require` a library before using it.

mod io;
mod math;
mod time;

use crate::errors::{wrong_arg_count, wrong_arg_type};
use crate::{ArityOrTypeError, LibraryRegistry, SharedPrintHandler, Value};

pub use io::install as install_io;
pub use math::install as install_math;
pub use time::install as install_time;

impl LibraryRegistry {
    /// A registry holding every standard library.
    pub fn standard(print: SharedPrintHandler) -> Self {
        let mut registry = LibraryRegistry::new();
        install_io(&mut registry, print);
        install_math(&mut registry);
        install_time(&mut registry);
        registry
    }
}

fn expect_args(function: &str, args: &[Value], n: usize) -> Result<(), ArityOrTypeError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(wrong_arg_count(function, n, args.len()))
    }
}

fn expect_number(function: &str, value: &Value) -> Result<f64, ArityOrTypeError> {
    value
        .as_f64()
        .ok_or_else(|| wrong_arg_type(function, "a number", value.type_name()))
}

#[cfg(test)]
mod tests;
