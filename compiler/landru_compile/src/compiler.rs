//! Recursive-descent lowering of the token tape into exemplars.
//!
//! The compiler walks the tape by index. Each bracketed construct is
//! compiled by one call to `compile_exemplar`, which returns the cursor one
//! past the construct's closing bracket. After every nested compile the
//! caller recomputes the matching bracket with `match_paren` and rejects the
//! result if the two disagree.

use landru_ir::{
    CallArgs, Exemplar, ExemplarArena, ExemplarId, ExemplarKind, Instruction, Name, TapeCursor,
    Token, TokenKind, TokenTape, ValueSource,
};
use landru_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::error::{CompileError, CompileErrorKind, CompileWarning};
use crate::options::CompileOptions;
use crate::paren::match_paren;

/// Reserved atoms with compile-time meaning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Keyword {
    Machine,
    State,
    On,
    Defun,
    Defum,
    Require,
    Launch,
    Goto,
    Set,
    Shared,
}

impl Keyword {
    pub(crate) fn parse(text: &str) -> Option<Keyword> {
        Some(match text {
            "machine" => Keyword::Machine,
            "state" => Keyword::State,
            "on" => Keyword::On,
            "defun" => Keyword::Defun,
            "defum" => Keyword::Defum,
            "require" => Keyword::Require,
            "launch" => Keyword::Launch,
            "goto" => Keyword::Goto,
            "set" => Keyword::Set,
            "shared" => Keyword::Shared,
            _ => return None,
        })
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Keyword::Machine => "machine",
            Keyword::State => "state",
            Keyword::On => "on",
            Keyword::Defun => "defun",
            Keyword::Defum => "defum",
            Keyword::Require => "require",
            Keyword::Launch => "launch",
            Keyword::Goto => "goto",
            Keyword::Set => "set",
            Keyword::Shared => "shared",
        }
    }

    /// Whether this keyword may appear directly inside `container`.
    fn allowed_in(self, container: ExemplarKind) -> bool {
        use ExemplarKind::{Function, Machine, On, Root, State};
        match self {
            Keyword::Machine | Keyword::Defun | Keyword::Defum => {
                matches!(container, Root | Machine | State)
            }
            Keyword::State => matches!(container, Machine | State),
            Keyword::On => matches!(container, State),
            Keyword::Goto => matches!(container, State | On),
            Keyword::Shared => matches!(container, Machine),
            Keyword::Require => matches!(container, Root | Machine),
            Keyword::Launch | Keyword::Set => {
                matches!(container, Root | Machine | State | On | Function)
            }
        }
    }
}

pub(crate) struct Compiler<'a> {
    tape: &'a TokenTape,
    options: &'a CompileOptions,
    arena: ExemplarArena,
    required: Vec<Name>,
    warnings: Vec<CompileWarning>,
}

/// Everything the compiler produced besides the root id.
pub(crate) struct CompilerOutput {
    pub(crate) arena: ExemplarArena,
    pub(crate) required: Vec<Name>,
    pub(crate) warnings: Vec<CompileWarning>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(tape: &'a TokenTape, options: &'a CompileOptions) -> Self {
        Compiler {
            tape,
            options,
            arena: ExemplarArena::new(),
            required: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> CompilerOutput {
        CompilerOutput {
            arena: self.arena,
            required: self.required,
            warnings: self.warnings,
        }
    }

    /// Compile an enclosed tape as the Root exemplar.
    ///
    /// The whole tape must be consumed.
    pub(crate) fn compile_root(&mut self) -> Result<ExemplarId, CompileError> {
        let open = TapeCursor::START;
        let (root, after) = self.compile_exemplar(open, ExemplarKind::Root)?;
        self.verify_closed(open, after, ExemplarKind::Root)?;
        if after != self.tape.end() {
            return Err(self.error(CompileErrorKind::TrailingTokens, after));
        }
        Ok(root)
    }

    /// Compile the construct opening at `open` as an exemplar of `kind`.
    ///
    /// Returns the new exemplar and the cursor one past its closing bracket.
    pub(crate) fn compile_exemplar(
        &mut self,
        open: TapeCursor,
        kind: ExemplarKind,
    ) -> Result<(ExemplarId, TapeCursor), CompileError> {
        ensure_sufficient_stack(|| self.compile_exemplar_inner(open, kind))
    }

    fn compile_exemplar_inner(
        &mut self,
        open: TapeCursor,
        kind: ExemplarKind,
    ) -> Result<(ExemplarId, TapeCursor), CompileError> {
        let open_token = self.token(open, kind)?;
        if open_token.kind != TokenKind::ListOpen {
            return Err(self.error(CompileErrorKind::ExpectedListOpen, open));
        }
        let mut cursor = open.next();

        let mut name = Name::EMPTY;
        let mut pure = false;
        if let Some(expected) = kind.keyword() {
            let keyword = self.keyword_at(cursor, kind)?;
            pure = match (kind, keyword) {
                (ExemplarKind::Function, Some(Keyword::Defun)) => true,
                (ExemplarKind::Function, Some(Keyword::Defum)) => false,
                (_, Some(k)) if k.as_str() == expected => false,
                _ => return Err(self.error(CompileErrorKind::ExpectedKeyword { expected }, cursor)),
            };
            cursor = cursor.next();
            name = self.name_at(cursor, expected, kind)?;
            cursor = cursor.next();
        }

        let mut exemplar = Exemplar::new(name, kind, open_token.offset);
        exemplar.pure = pure;
        let id = self.arena.alloc(exemplar);
        trace!(%id, %kind, name = self.tape.interner().lookup(name), "compiling exemplar");

        match kind {
            ExemplarKind::On => {
                let arg = self.token(cursor, kind)?;
                let Some(constant) = arg.kind.as_constant() else {
                    return Err(self.error(CompileErrorKind::ExpectedConditionArg, cursor));
                };
                self.arena.get_mut(id).condition_arg = Some(constant);
                cursor = cursor.next();
                if self.token(cursor, kind)?.kind != TokenKind::ListOpen {
                    return Err(self.error(CompileErrorKind::ExpectedHandlerBody, cursor));
                }
            }
            ExemplarKind::Function => {
                cursor = self.compile_params(id, cursor)?;
            }
            ExemplarKind::Monad | ExemplarKind::List => {
                let after = self.compile_inline_call(id, open.next(), kind)?;
                return Ok((id, after));
            }
            ExemplarKind::Root | ExemplarKind::Machine | ExemplarKind::State => {}
        }

        let after = self.compile_body(id, kind, cursor)?;
        Ok((id, after))
    }

    /// `(param ...)` directly after a function's name.
    fn compile_params(
        &mut self,
        id: ExemplarId,
        mut cursor: TapeCursor,
    ) -> Result<TapeCursor, CompileError> {
        let kind = ExemplarKind::Function;
        if self.token(cursor, kind)?.kind != TokenKind::ListOpen {
            return Err(self.error(CompileErrorKind::ExpectedParameterList, cursor));
        }
        cursor = cursor.next();
        loop {
            match self.token(cursor, kind)?.kind {
                TokenKind::ListClose => return Ok(cursor.next()),
                TokenKind::Atom(param) if Keyword::parse(self.text(param)).is_none() => {
                    self.arena.get_mut(id).params.push(param);
                    cursor = cursor.next();
                }
                _ => return Err(self.error(CompileErrorKind::ExpectedParameter, cursor)),
            }
        }
    }

    /// Scan forms until the bracket that closes the construct.
    fn compile_body(
        &mut self,
        id: ExemplarId,
        kind: ExemplarKind,
        mut cursor: TapeCursor,
    ) -> Result<TapeCursor, CompileError> {
        loop {
            let token = self.token(cursor, kind)?;
            match token.kind {
                TokenKind::ListClose => return Ok(cursor.next()),
                TokenKind::ListOpen => cursor = self.compile_form(id, kind, cursor)?,
                other => {
                    return Err(self.error(
                        CompileErrorKind::UnexpectedToken {
                            found: other.describe(),
                            construct: kind,
                        },
                        cursor,
                    ))
                }
            }
        }
    }

    /// One parenthesized form inside a body, dispatched on its head atom.
    fn compile_form(
        &mut self,
        owner: ExemplarId,
        container: ExemplarKind,
        open: TapeCursor,
    ) -> Result<TapeCursor, CompileError> {
        let head = open.next();
        let head_token = self.token(head, container)?;
        let head_name = match head_token.kind {
            TokenKind::ListClose => return Ok(head.next()),
            TokenKind::Atom(name) => name,
            _ => return Err(self.error(CompileErrorKind::ExpectedFormHead, head)),
        };

        let Some(keyword) = Keyword::parse(self.text(head_name)) else {
            let (args, after) = self.compile_args(owner, head.next(), container)?;
            self.push_instruction(owner, Instruction::Call(head_name, args), open);
            return Ok(after);
        };

        if !keyword.allowed_in(container) {
            return Err(self.error(
                CompileErrorKind::NotAllowedHere {
                    keyword: keyword.as_str(),
                    container,
                },
                head,
            ));
        }

        match keyword {
            Keyword::Machine => self.compile_nested(owner, open, ExemplarKind::Machine),
            Keyword::State => self.compile_nested(owner, open, ExemplarKind::State),
            Keyword::On => self.compile_nested(owner, open, ExemplarKind::On),
            Keyword::Defun | Keyword::Defum => {
                self.compile_nested(owner, open, ExemplarKind::Function)
            }
            Keyword::Require => self.compile_require(head),
            Keyword::Launch | Keyword::Goto => self.compile_transfer(owner, open, keyword),
            Keyword::Set | Keyword::Shared => self.compile_assignment(owner, open, keyword),
        }
    }

    /// Compile a nested machine/state/on/function and file it under `owner`.
    fn compile_nested(
        &mut self,
        owner: ExemplarId,
        open: TapeCursor,
        kind: ExemplarKind,
    ) -> Result<TapeCursor, CompileError> {
        let (child, after) = self.compile_exemplar(open, kind)?;
        self.verify_closed(open, after, kind)?;
        self.arena.get_mut(child).parent = Some(owner);

        let child_name = self.arena.get(child).name;
        let owner_kind = self.arena.get(owner).kind;
        let parent = self.arena.get_mut(owner);
        let duplicate = match kind {
            ExemplarKind::On => {
                parent.event_handlers.push(child);
                false
            }
            ExemplarKind::Function => parent.nested_functions.insert(child_name, child).is_some(),
            _ => parent.nested_machines.insert(child_name, child).is_some(),
        };
        if duplicate {
            return Err(self.error(
                CompileErrorKind::DuplicateDefinition {
                    name: self.text(child_name).to_string(),
                    container: owner_kind,
                },
                open,
            ));
        }
        Ok(after)
    }

    /// Compile an inline value (`Monad` or `List`) and parent it to `owner`.
    fn compile_value(
        &mut self,
        owner: ExemplarId,
        open: TapeCursor,
        kind: ExemplarKind,
    ) -> Result<(ValueSource, TapeCursor), CompileError> {
        let (child, after) = self.compile_exemplar(open, kind)?;
        self.verify_closed(open, after, kind)?;
        self.arena.get_mut(child).parent = Some(owner);
        Ok((ValueSource::Nested(child), after))
    }

    /// Body of a `Monad`/`List`: `callee arg*` up to the closing bracket.
    fn compile_inline_call(
        &mut self,
        id: ExemplarId,
        head: TapeCursor,
        kind: ExemplarKind,
    ) -> Result<TapeCursor, CompileError> {
        let callee = match self.token(head, kind)?.kind {
            TokenKind::Atom(name) => name,
            _ => return Err(self.error(CompileErrorKind::ExpectedFormHead, head)),
        };
        if let Some(keyword) = Keyword::parse(self.text(callee)) {
            return Err(self.error(
                CompileErrorKind::NotAllowedHere {
                    keyword: keyword.as_str(),
                    container: kind,
                },
                head,
            ));
        }
        let (args, after) = self.compile_args(id, head.next(), kind)?;
        self.arena
            .get_mut(id)
            .instructions
            .push(Instruction::Call(callee, args));
        Ok(after)
    }

    /// Constants and nested lists up to and including the closing bracket.
    fn compile_args(
        &mut self,
        owner: ExemplarId,
        mut cursor: TapeCursor,
        container: ExemplarKind,
    ) -> Result<(CallArgs, TapeCursor), CompileError> {
        let mut args = CallArgs::new();
        loop {
            let token = self.token(cursor, container)?;
            match token.kind {
                TokenKind::ListClose => return Ok((args, cursor.next())),
                TokenKind::ListOpen => {
                    let (value, after) = self.compile_value(owner, cursor, ExemplarKind::List)?;
                    args.push(value);
                    cursor = after;
                }
                other => {
                    if let Some(constant) = other.as_constant() {
                        args.push(ValueSource::Constant(constant));
                    }
                    cursor = cursor.next();
                }
            }
        }
    }

    /// `(require name)`: validated and recorded now, no instruction.
    fn compile_require(&mut self, head: TapeCursor) -> Result<TapeCursor, CompileError> {
        let malformed = CompileErrorKind::MalformedForm { keyword: "require" };
        let lib_cursor = head.next();
        let TokenKind::Atom(lib) = self.token(lib_cursor, ExemplarKind::Root)?.kind else {
            return Err(self.error(malformed, lib_cursor));
        };
        let close = lib_cursor.next();
        if self.token(close, ExemplarKind::Root)?.kind != TokenKind::ListClose {
            return Err(self.error(malformed, close));
        }
        let lib_text = self.text(lib);
        if !self.options.allows(lib_text) {
            return Err(self.error(
                CompileErrorKind::UnknownLibrary {
                    name: lib_text.to_string(),
                },
                lib_cursor,
            ));
        }
        if !self.required.contains(&lib) {
            self.required.push(lib);
        }
        Ok(close.next())
    }

    /// `(launch name)` / `(goto name)`.
    fn compile_transfer(
        &mut self,
        owner: ExemplarId,
        open: TapeCursor,
        keyword: Keyword,
    ) -> Result<TapeCursor, CompileError> {
        let owner_ex = self.arena.get(owner);
        if keyword == Keyword::Launch && owner_ex.kind == ExemplarKind::Function && owner_ex.pure {
            return Err(self.error(
                CompileErrorKind::NotAllowedInPureFunction { keyword: "launch" },
                open.next(),
            ));
        }

        let malformed = CompileErrorKind::MalformedForm {
            keyword: keyword.as_str(),
        };
        let target_cursor = open.next().next();
        let target = match self.token(target_cursor, ExemplarKind::State)?.kind {
            TokenKind::Atom(name) if Keyword::parse(self.text(name)).is_none() => name,
            _ => return Err(self.error(malformed, target_cursor)),
        };
        let close = target_cursor.next();
        if self.token(close, ExemplarKind::State)?.kind != TokenKind::ListClose {
            return Err(self.error(malformed, close));
        }

        let instruction = if keyword == Keyword::Launch {
            Instruction::Launch(target)
        } else {
            Instruction::Goto(target)
        };
        self.push_instruction(owner, instruction, open);
        Ok(close.next())
    }

    /// `(set name value)` / `(shared name value)`.
    fn compile_assignment(
        &mut self,
        owner: ExemplarId,
        open: TapeCursor,
        keyword: Keyword,
    ) -> Result<TapeCursor, CompileError> {
        let container = self.arena.get(owner).kind;
        let name_cursor = open.next().next();
        let name = self.name_at(name_cursor, keyword.as_str(), container)?;

        let value_cursor = name_cursor.next();
        let value_token = self.token(value_cursor, container)?;
        let (value, after) = match value_token.kind {
            TokenKind::ListOpen => self.compile_value(owner, value_cursor, ExemplarKind::Monad)?,
            other => match other.as_constant() {
                Some(constant) => (ValueSource::Constant(constant), value_cursor.next()),
                None => {
                    return Err(self.error(
                        CompileErrorKind::MalformedForm {
                            keyword: keyword.as_str(),
                        },
                        value_cursor,
                    ))
                }
            },
        };
        if self.token(after, container)?.kind != TokenKind::ListClose {
            return Err(self.error(
                CompileErrorKind::MalformedForm {
                    keyword: keyword.as_str(),
                },
                after,
            ));
        }

        let instruction = if keyword == Keyword::Shared {
            Instruction::Shared(name, value)
        } else {
            Instruction::SetVar(name, value)
        };
        self.push_instruction(owner, instruction, open);
        Ok(after.next())
    }

    fn push_instruction(&mut self, owner: ExemplarId, instruction: Instruction, at: TapeCursor) {
        let exemplar = self.arena.get(owner);
        // Only state and handler runs end at a transfer.
        let suspends = matches!(exemplar.kind, ExemplarKind::State | ExemplarKind::On);
        if suspends && self.options.warns_unreachable() {
            if let Some(last) = exemplar.instructions.last().filter(|i| i.is_transfer()) {
                let warning = CompileWarning::UnreachableInstructions {
                    exemplar: self.text(exemplar.name).to_string(),
                    after: last.keyword(),
                    offset: self.tape.get(at).map_or(0, |t| t.offset),
                };
                self.warnings.push(warning);
            }
        }
        self.arena.get_mut(owner).instructions.push(instruction);
    }

    /// Trust-but-verify: a nested compile must end one past the bracket
    /// matching the one it started from.
    fn verify_closed(
        &self,
        open: TapeCursor,
        after: TapeCursor,
        construct: ExemplarKind,
    ) -> Result<(), CompileError> {
        match match_paren(self.tape, open) {
            Some(close) if close.next() == after => Ok(()),
            _ => Err(self.error(CompileErrorKind::NotProperlyClosed { construct }, open)),
        }
    }

    fn token(&self, cursor: TapeCursor, construct: ExemplarKind) -> Result<Token, CompileError> {
        self.tape
            .get(cursor)
            .copied()
            .ok_or_else(|| self.error(CompileErrorKind::UnexpectedEnd { construct }, cursor))
    }

    /// The keyword at `cursor`, `None` for non-keyword atoms.
    fn keyword_at(
        &self,
        cursor: TapeCursor,
        construct: ExemplarKind,
    ) -> Result<Option<Keyword>, CompileError> {
        match self.token(cursor, construct)?.kind {
            TokenKind::Atom(name) => Ok(Keyword::parse(self.text(name))),
            _ => Ok(None),
        }
    }

    /// A non-keyword atom naming something introduced by `keyword`.
    fn name_at(
        &self,
        cursor: TapeCursor,
        keyword: &'static str,
        construct: ExemplarKind,
    ) -> Result<Name, CompileError> {
        match self.token(cursor, construct)?.kind {
            TokenKind::Atom(name) => match Keyword::parse(self.text(name)) {
                Some(k) => Err(self.error(
                    CompileErrorKind::KeywordAsName {
                        keyword: k.as_str(),
                    },
                    cursor,
                )),
                None => Ok(name),
            },
            _ => Err(self.error(CompileErrorKind::ExpectedName { keyword }, cursor)),
        }
    }

    #[inline]
    fn text(&self, name: Name) -> &'a str {
        self.tape.interner().lookup(name)
    }

    #[cold]
    fn error(&self, kind: CompileErrorKind, at: TapeCursor) -> CompileError {
        CompileError::new(kind, self.tape, at)
    }
}

#[cfg(test)]
mod tests;
