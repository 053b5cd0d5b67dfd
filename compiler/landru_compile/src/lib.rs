//! Landru Compile - lowers a token tape into a tree of machine exemplars.
//!
//! # Pipeline
//!
//! ```text
//! TokenTape --enclosed()--> Compiler::compile_root --> Program (Root exemplar)
//! ```
//!
//! The compiler never builds a syntax tree: it walks the tape by index and
//! emits exemplars straight into an `ExemplarArena`. `(require ...)` is
//! executed during compilation; every other form becomes an exemplar or an
//! instruction. Functions named by calls are resolved at run time, so an
//! unknown function is never a compile error.

mod compiler;
mod dump;
mod error;
mod options;
mod paren;

pub use dump::dump_program;
pub use error::{CompileError, CompileErrorKind, CompileWarning, TokenContext, CONTEXT_TOKENS};
pub use options::{CompileOptions, STANDARD_LIBRARIES};
pub use paren::{is_balanced, match_paren};

use landru_ir::{Program, TokenTape};

/// A compiled program plus the warnings found while compiling it.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub program: Program,
    pub warnings: Vec<CompileWarning>,
}

/// Compile a program with default options.
///
/// `tape` holds the program's top-level forms; the implicit outer bracket
/// is added here. Warnings are logged and dropped.
pub fn compile_program(tape: TokenTape) -> Result<Program, CompileError> {
    compile_program_with(tape, &CompileOptions::default()).map(|c| c.program)
}

/// Compile a program with explicit options, keeping the warnings.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tape.len()))]
pub fn compile_program_with(
    tape: TokenTape,
    options: &CompileOptions,
) -> Result<Compilation, CompileError> {
    let tape = tape.enclosed();
    let mut compiler = compiler::Compiler::new(&tape, options);
    let root = compiler.compile_root()?;
    let output = compiler.finish();

    for warning in &output.warnings {
        tracing::warn!(%warning, "compile warning");
    }
    tracing::debug!(
        exemplars = output.arena.len(),
        libraries = output.required.len(),
        "compile complete"
    );

    Ok(Compilation {
        program: Program {
            arena: output.arena,
            root,
            interner: tape.into_interner(),
            required_libraries: output.required,
        },
        warnings: output.warnings,
    })
}
