//! Compile errors and warnings.

use std::fmt;

use landru_ir::{ExemplarKind, TapeCursor, TokenTape};
use thiserror::Error;

/// How many tokens after the offending one are captured for diagnostics.
pub const CONTEXT_TOKENS: usize = 7;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("expected `(`")]
    ExpectedListOpen,
    #[error("unexpected end of input inside {construct}")]
    UnexpectedEnd { construct: ExemplarKind },
    #[error("expected keyword `{expected}`")]
    ExpectedKeyword { expected: &'static str },
    #[error("expected a name after `{keyword}`")]
    ExpectedName { keyword: &'static str },
    #[error("keyword `{keyword}` cannot be used as a name")]
    KeywordAsName { keyword: &'static str },
    #[error("expected an event condition argument")]
    ExpectedConditionArg,
    #[error("expected a handler body after the event condition")]
    ExpectedHandlerBody,
    #[error("expected a parameter list")]
    ExpectedParameterList,
    #[error("expected a parameter name")]
    ExpectedParameter,
    #[error("expected a form name")]
    ExpectedFormHead,
    #[error("unexpected {found} in {construct} body")]
    UnexpectedToken {
        found: &'static str,
        construct: ExemplarKind,
    },
    #[error("`{keyword}` is not allowed in {container}")]
    NotAllowedHere {
        keyword: &'static str,
        container: ExemplarKind,
    },
    #[error("`{keyword}` is not allowed in a pure function")]
    NotAllowedInPureFunction { keyword: &'static str },
    #[error("unknown library `{name}`")]
    UnknownLibrary { name: String },
    #[error("malformed `{keyword}` form")]
    MalformedForm { keyword: &'static str },
    #[error("{construct} not properly closed")]
    NotProperlyClosed { construct: ExemplarKind },
    #[error("duplicate definition of `{name}` in {container}")]
    DuplicateDefinition {
        name: String,
        container: ExemplarKind,
    },
    #[error("unexpected tokens after the end of the program")]
    TrailingTokens,
}

/// Where an error happened: the offending token and what follows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenContext {
    /// Position on the enclosed tape (index 0 is the implicit outer bracket).
    pub position: TapeCursor,
    /// Source byte offset, if the position is on the tape.
    pub offset: Option<u32>,
    /// Kind of the offending token, or `end of input`.
    pub found: &'static str,
    /// The offending token followed by up to `CONTEXT_TOKENS` more, rendered.
    pub tokens: Vec<String>,
}

impl TokenContext {
    /// Capture context at `position`.
    pub fn capture(tape: &TokenTape, position: TapeCursor) -> Self {
        let Some(token) = tape.get(position) else {
            return TokenContext {
                position,
                offset: None,
                found: "end of input",
                tokens: Vec::new(),
            };
        };
        let tokens = tape.tokens()[position.index()..]
            .iter()
            .take(CONTEXT_TOKENS + 1)
            .map(|t| tape.describe_token(t))
            .collect();
        TokenContext {
            position,
            offset: Some(token.offset),
            found: token.kind.describe(),
            tokens,
        }
    }
}

impl fmt::Display for TokenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "at byte {offset}: found {}", self.found)?,
            None => write!(f, "at {}", self.found)?,
        }
        if !self.tokens.is_empty() {
            write!(f, " near `{}`", self.tokens.join(" "))?;
        }
        Ok(())
    }
}

/// A fatal compile error with source context.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} ({context})")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub context: TokenContext,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, tape: &TokenTape, position: TapeCursor) -> Self {
        CompileError {
            kind,
            context: TokenContext::capture(tape, position),
        }
    }
}

/// Non-fatal findings collected during compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileWarning {
    /// Instructions follow a `goto`/`launch` in the same list and never run.
    UnreachableInstructions {
        /// Name of the exemplar holding the list (empty for the Root).
        exemplar: String,
        /// The transfer keyword that ends the reachable part.
        after: &'static str,
        /// Source offset of the first unreachable form.
        offset: u32,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::UnreachableInstructions {
                exemplar,
                after,
                offset,
            } => {
                let owner = if exemplar.is_empty() {
                    "program root"
                } else {
                    exemplar.as_str()
                };
                write!(
                    f,
                    "unreachable instructions after `{after}` in `{owner}` at byte {offset}"
                )
            }
        }
    }
}
