//! Tokens and the flat token tape.
//!
//! The tape is the compiler's only input. It is a plain vector walked by
//! index (`TapeCursor`), never a linked structure.

use std::fmt;

use super::{Name, StringInterner};

/// The payload of a single token.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Bare identifier, possibly dotted (`io.print`).
    Atom(Name),
    /// Double-quoted string literal, unescaped.
    Str(Name),
    Int(i64),
    Float(f64),
    ListOpen,
    ListClose,
}

impl TokenKind {
    /// Short tag used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Atom(_) => "atom",
            TokenKind::Str(_) => "string",
            TokenKind::Int(_) => "integer",
            TokenKind::Float(_) => "float",
            TokenKind::ListOpen => "list-open",
            TokenKind::ListClose => "list-close",
        }
    }

    /// Returns the constant carried by this token, if it is one.
    ///
    /// Brackets are structure, not constants.
    pub fn as_constant(&self) -> Option<Constant> {
        match *self {
            TokenKind::Atom(name) => Some(Constant::Atom(name)),
            TokenKind::Str(name) => Some(Constant::Str(name)),
            TokenKind::Int(v) => Some(Constant::Int(v)),
            TokenKind::Float(v) => Some(Constant::Float(v)),
            TokenKind::ListOpen | TokenKind::ListClose => None,
        }
    }
}

/// A token plus the byte offset where it started in the source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: u32,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, offset: u32) -> Self {
        Token { kind, offset }
    }
}

/// A literal value captured from the tape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Constant {
    /// Late-bound reference; resolved as a variable when evaluated.
    Atom(Name),
    Str(Name),
    Int(i64),
    Float(f64),
}

impl Constant {
    /// Render the constant the way it would appear in source.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> impl fmt::Display + 'a {
        ConstantDisplay {
            constant: self,
            interner,
        }
    }
}

struct ConstantDisplay<'a> {
    constant: &'a Constant,
    interner: &'a StringInterner,
}

impl fmt::Display for ConstantDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.constant {
            Constant::Atom(name) => f.write_str(self.interner.lookup(name)),
            Constant::Str(name) => write!(f, "{:?}", self.interner.lookup(name)),
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Position on a `TokenTape`.
///
/// A cursor equal to `tape.len()` is "one past the end" and is a valid
/// return position for a compile that consumed the final token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TapeCursor(usize);

impl TapeCursor {
    pub const START: TapeCursor = TapeCursor(0);

    #[inline]
    pub const fn new(index: usize) -> Self {
        TapeCursor(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// The next position.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        TapeCursor(self.0 + 1)
    }
}

impl fmt::Display for TapeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flat, immutable-once-built sequence of tokens plus the interner their
/// names belong to.
#[derive(Clone, Debug, Default)]
pub struct TokenTape {
    tokens: Vec<Token>,
    interner: StringInterner,
}

impl TokenTape {
    /// Create an empty tape that owns `interner`.
    pub fn new(interner: StringInterner) -> Self {
        TokenTape {
            tokens: Vec::new(),
            interner,
        }
    }

    /// Append a token.
    pub fn push(&mut self, kind: TokenKind, offset: u32) {
        self.tokens.push(Token::new(kind, offset));
    }

    /// Append an atom, interning its text.
    pub fn push_atom(&mut self, text: &str, offset: u32) {
        let name = self.interner.intern(text);
        self.push(TokenKind::Atom(name), offset);
    }

    /// Append a string literal, interning its contents.
    pub fn push_str(&mut self, text: &str, offset: u32) {
        let name = self.interner.intern(text);
        self.push(TokenKind::Str(name), offset);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `cursor`, or `None` past the end.
    #[inline]
    pub fn get(&self, cursor: TapeCursor) -> Option<&Token> {
        self.tokens.get(cursor.index())
    }

    /// Position one past the last token.
    #[inline]
    pub fn end(&self) -> TapeCursor {
        TapeCursor(self.tokens.len())
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Wrap the whole tape in one extra bracket pair.
    ///
    /// This is the implicit outer bracket that turns a program's top-level
    /// forms into the body of the Root exemplar.
    #[must_use]
    pub fn enclosed(self) -> Self {
        let end_offset = self.tokens.last().map_or(0, |t| t.offset);
        let mut tokens = Vec::with_capacity(self.tokens.len() + 2);
        tokens.push(Token::new(TokenKind::ListOpen, 0));
        tokens.extend(self.tokens);
        tokens.push(Token::new(TokenKind::ListClose, end_offset));
        TokenTape {
            tokens,
            interner: self.interner,
        }
    }

    /// Give up the tape, keeping its interner.
    pub fn into_interner(self) -> StringInterner {
        self.interner
    }

    /// Render one token for diagnostics.
    pub fn describe_token(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Atom(name) => self.interner.lookup(name).to_string(),
            TokenKind::Str(name) => format!("{:?}", self.interner.lookup(name)),
            TokenKind::Int(v) => v.to_string(),
            TokenKind::Float(v) => format!("{v:?}"),
            TokenKind::ListOpen => "(".to_string(),
            TokenKind::ListClose => ")".to_string(),
        }
    }
}
