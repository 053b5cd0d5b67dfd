//! Landru IR - data structures shared by the reader, compiler, and engine.
//!
//! - `Name`s for interned identifiers and string literals
//! - `Token`s and the flat `TokenTape` the compiler walks
//! - `Exemplar`s (compiled machine templates) in an `ExemplarArena`
//! - `Instruction`s carried by each exemplar
//! - `Program`, the output of a successful compile
//!
//! # Design
//!
//! - **Flat tape**: the compiler walks tokens by index; no syntax tree is built.
//! - **Arena + index**: exemplars refer to each other through `ExemplarId`,
//!   so parent back-references never own anything.

mod exemplar;
mod instruction;
mod interner;
mod name;
mod program;
mod token;

pub use exemplar::{Exemplar, ExemplarArena, ExemplarId, ExemplarKind};
pub use instruction::{CallArgs, Instruction, ValueSource};
pub use interner::StringInterner;
pub use name::Name;
pub use program::Program;
pub use token::{Constant, TapeCursor, Token, TokenKind, TokenTape};
