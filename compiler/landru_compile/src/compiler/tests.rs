#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::{compile_program, compile_program_with, is_balanced, CONTEXT_TOKENS};
use landru_ir::{Constant, Program};
use pretty_assertions::assert_eq;

fn compile(source: &str) -> Result<Program, CompileError> {
    compile_program(landru_lexer::read(source).unwrap())
}

fn compile_with(source: &str, options: &CompileOptions) -> Result<crate::Compilation, CompileError> {
    compile_program_with(landru_lexer::read(source).unwrap(), options)
}

fn error_kind(source: &str) -> CompileErrorKind {
    compile(source).unwrap_err().kind
}

fn child(program: &Program, owner: ExemplarId, name: &str) -> ExemplarId {
    let name = program.interner.get(name).unwrap();
    *program.arena.get(owner).nested_machines.get(&name).unwrap()
}

// Round trip

#[test]
fn test_require_machine_launch_round_trip() {
    let options = CompileOptions::default().with_library("t");
    let program = compile_with("(require t)(machine m (state main ()))(launch m)", &options)
        .unwrap()
        .program;

    assert_eq!(program.required_library_names().collect::<Vec<_>>(), vec!["t"]);

    let root = program.arena.get(program.root);
    assert_eq!(root.kind, ExemplarKind::Root);
    assert_eq!(root.parent, None);
    assert_eq!(root.nested_machines.len(), 1);

    let m = child(&program, program.root, "m");
    let machine = program.arena.get(m);
    assert_eq!(machine.kind, ExemplarKind::Machine);
    assert_eq!(machine.parent, Some(program.root));
    assert_eq!(machine.nested_machines.len(), 1);

    let main = child(&program, m, "main");
    let state = program.arena.get(main);
    assert_eq!(state.kind, ExemplarKind::State);
    assert_eq!(state.parent, Some(m));
    assert!(state.instructions.is_empty());

    let m_name = program.interner.get("m").unwrap();
    assert_eq!(root.instructions, vec![Instruction::Launch(m_name)]);
}

#[test]
fn test_empty_program() {
    let program = compile("").unwrap();
    let root = program.arena.get(program.root);
    assert!(root.instructions.is_empty());
    assert!(root.nested_machines.is_empty());
    assert_eq!(program.arena.len(), 1);
}

#[test]
fn test_require_is_deduplicated_and_emits_no_instruction() {
    let program = compile("(require io)(require time)(require io)").unwrap();
    assert_eq!(
        program.required_library_names().collect::<Vec<_>>(),
        vec!["io", "time"]
    );
    assert!(program.arena.get(program.root).instructions.is_empty());
}

// Instructions

#[test]
fn test_set_constant_and_monad() {
    let program = compile("(set e 3.0)(set f (math.add e 1))").unwrap();
    let root = program.arena.get(program.root);
    let e = program.interner.get("e").unwrap();
    let f = program.interner.get("f").unwrap();

    assert_eq!(
        root.instructions[0],
        Instruction::SetVar(e, ValueSource::Constant(Constant::Float(3.0)))
    );
    let Instruction::SetVar(name, ValueSource::Nested(monad)) = &root.instructions[1] else {
        panic!("expected nested set, got {:?}", root.instructions[1]);
    };
    assert_eq!(*name, f);

    let monad = program.arena.get(*monad);
    assert_eq!(monad.kind, ExemplarKind::Monad);
    assert_eq!(monad.parent, Some(program.root));
    let add = program.interner.get("math.add").unwrap();
    let mut args = CallArgs::new();
    args.push(ValueSource::Constant(Constant::Atom(e)));
    args.push(ValueSource::Constant(Constant::Int(1)));
    assert_eq!(monad.instructions, vec![Instruction::Call(add, args)]);
}

#[test]
fn test_call_with_nested_list_argument() {
    let program = compile("(machine m (state main (io.print \"sum\" (math.add 1 2))))").unwrap();
    let main = child(&program, child(&program, program.root, "m"), "main");
    let Instruction::Call(_, args) = &program.arena.get(main).instructions[0] else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(args[0], ValueSource::Constant(Constant::Str(_))));
    let ValueSource::Nested(list) = args[1] else {
        panic!("expected nested argument");
    };
    assert_eq!(program.arena.get(list).kind, ExemplarKind::List);
    assert_eq!(program.arena.get(list).parent, Some(main));
}

#[test]
fn test_call_without_arguments() {
    let program = compile("(machine m (state main (tick)))").unwrap();
    let main = child(&program, child(&program, program.root, "m"), "main");
    let tick = program.interner.get("tick").unwrap();
    assert_eq!(
        program.arena.get(main).instructions,
        vec![Instruction::Call(tick, CallArgs::new())]
    );
}

#[test]
fn test_shared_instruction() {
    let program = compile("(machine m (shared c 3.0) (state main ()))").unwrap();
    let m = program.arena.get(child(&program, program.root, "m"));
    let c = program.interner.get("c").unwrap();
    assert_eq!(
        m.instructions,
        vec![Instruction::Shared(c, ValueSource::Constant(Constant::Float(3.0)))]
    );
}

#[test]
fn test_on_handler() {
    let program =
        compile("(machine m (state main (on time.after 0.5 (io.print 1) (goto done))) (state done ()))")
            .unwrap();
    let main = program.arena.get(child(&program, child(&program, program.root, "m"), "main"));
    assert_eq!(main.event_handlers.len(), 1);
    assert!(main.instructions.is_empty());

    let handler = program.arena.get(main.event_handlers[0]);
    assert_eq!(handler.kind, ExemplarKind::On);
    assert_eq!(program.name(handler.name), "time.after");
    assert_eq!(handler.condition_arg, Some(Constant::Float(0.5)));
    assert_eq!(handler.instructions.len(), 2);
    assert!(handler.instructions[1].is_transfer());
}

#[test]
fn test_functions() {
    let program = compile(
        "(defun double (x) (math.mul x 2))
         (machine m (defum shout (msg) (io.print msg) (launch m)) (state main ()))",
    )
    .unwrap();
    let double_name = program.interner.get("double").unwrap();
    let double = program.arena.get(program.root).nested_functions[&double_name];
    let double = program.arena.get(double);
    assert_eq!(double.kind, ExemplarKind::Function);
    assert!(double.pure);
    assert_eq!(double.params, vec![program.interner.get("x").unwrap()]);

    let m = child(&program, program.root, "m");
    let shout_name = program.interner.get("shout").unwrap();
    let shout = program.arena.get(program.arena.get(m).nested_functions[&shout_name]);
    assert!(!shout.pure);
    assert_eq!(shout.parent, Some(m));
    assert_eq!(shout.instructions.len(), 2);
}

#[test]
fn test_nested_states() {
    let program = compile("(machine m (state main (state inner (goto main)) (goto inner)))").unwrap();
    let main = child(&program, child(&program, program.root, "m"), "main");
    let inner = child(&program, main, "inner");
    assert_eq!(program.arena.get(inner).parent, Some(main));
}

// Warnings

#[test]
fn test_unreachable_after_goto_warns() {
    let compilation = compile_with(
        "(machine m (state main (goto b) (io.print 1)) (state b ()))",
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(compilation.warnings.len(), 1);
    assert!(matches!(
        &compilation.warnings[0],
        CompileWarning::UnreachableInstructions { exemplar, after: "goto", .. } if exemplar == "main"
    ));
}

#[test]
fn test_handlers_after_goto_do_not_warn() {
    let compilation = compile_with(
        "(machine m (state main (goto b) (on time.after 1 (goto b))) (state b ()))",
        &CompileOptions::default(),
    )
    .unwrap();
    assert!(compilation.warnings.is_empty());
}

#[test]
fn test_warnings_can_be_disabled() {
    let compilation = compile_with(
        "(machine m (state main (goto b) (io.print 1)) (state b ()))",
        &CompileOptions::default().warn_unreachable(false),
    )
    .unwrap();
    assert!(compilation.warnings.is_empty());
}

#[test]
fn test_root_launches_do_not_warn() {
    let compilation = compile_with(
        "(launch a)(launch b)(machine a (state main ()))(machine b (state main ()))",
        &CompileOptions::default(),
    )
    .unwrap();
    assert!(compilation.warnings.is_empty());
}

// Errors

#[test]
fn test_unknown_library() {
    assert_eq!(
        error_kind("(require t)"),
        CompileErrorKind::UnknownLibrary {
            name: "t".to_string()
        }
    );
}

#[test]
fn test_empty_allow_list_rejects_standard_library() {
    let options = CompileOptions::default().without_standard_libraries();
    assert!(matches!(
        compile_with("(require io)", &options).unwrap_err().kind,
        CompileErrorKind::UnknownLibrary { .. }
    ));
}

#[test]
fn test_unclosed_machine() {
    assert_eq!(
        error_kind("(machine m (state main ())"),
        CompileErrorKind::UnexpectedEnd {
            construct: ExemplarKind::Root
        }
    );
}

#[test]
fn test_extra_close_is_rejected() {
    assert_eq!(
        error_kind("(machine m (state main ()))) (launch m)"),
        CompileErrorKind::TrailingTokens
    );
}

#[test]
fn test_goto_shape() {
    assert_eq!(
        error_kind("(machine m (state main (goto a b)))"),
        CompileErrorKind::MalformedForm { keyword: "goto" }
    );
    assert_eq!(
        error_kind("(machine m (state main (goto 3)))"),
        CompileErrorKind::MalformedForm { keyword: "goto" }
    );
    assert_eq!(
        error_kind("(launch (m))"),
        CompileErrorKind::MalformedForm { keyword: "launch" }
    );
}

#[test]
fn test_keyword_as_name() {
    assert_eq!(
        error_kind("(set machine 1)"),
        CompileErrorKind::KeywordAsName { keyword: "machine" }
    );
    assert_eq!(
        error_kind("(machine state (state main ()))"),
        CompileErrorKind::KeywordAsName { keyword: "state" }
    );
}

#[test]
fn test_placement_rules() {
    assert_eq!(
        error_kind("(goto main)"),
        CompileErrorKind::NotAllowedHere {
            keyword: "goto",
            container: ExemplarKind::Root
        }
    );
    assert_eq!(
        error_kind("(state main ())"),
        CompileErrorKind::NotAllowedHere {
            keyword: "state",
            container: ExemplarKind::Root
        }
    );
    assert_eq!(
        error_kind("(machine m (state main (shared c 1)))"),
        CompileErrorKind::NotAllowedHere {
            keyword: "shared",
            container: ExemplarKind::State
        }
    );
    assert_eq!(
        error_kind("(defum f () (goto x))"),
        CompileErrorKind::NotAllowedHere {
            keyword: "goto",
            container: ExemplarKind::Function
        }
    );
}

#[test]
fn test_pure_function_cannot_launch() {
    assert_eq!(
        error_kind("(defun f () (launch m))"),
        CompileErrorKind::NotAllowedInPureFunction { keyword: "launch" }
    );
}

#[test]
fn test_function_requires_parameter_list() {
    assert_eq!(
        error_kind("(defun f (io.print 1))"),
        CompileErrorKind::ExpectedParameter
    );
    assert_eq!(error_kind("(defun f)"), CompileErrorKind::ExpectedParameterList);
}

#[test]
fn test_on_requires_condition_and_body() {
    assert_eq!(
        error_kind("(machine m (state main (on time.after (goto b))))"),
        CompileErrorKind::ExpectedConditionArg
    );
    assert_eq!(
        error_kind("(machine m (state main (on time.after 1 2)))"),
        CompileErrorKind::ExpectedHandlerBody
    );
}

#[test]
fn test_duplicate_state() {
    assert_eq!(
        error_kind("(machine m (state main ()) (state main ()))"),
        CompileErrorKind::DuplicateDefinition {
            name: "main".to_string(),
            container: ExemplarKind::Machine
        }
    );
}

#[test]
fn test_bare_constant_in_body() {
    assert_eq!(
        error_kind("(machine m 3)"),
        CompileErrorKind::UnexpectedToken {
            found: "integer",
            construct: ExemplarKind::Machine
        }
    );
}

#[test]
fn test_error_context_carries_following_tokens() {
    let err = compile("(require nope) (machine m (state main (goto a)))").unwrap_err();
    assert_eq!(err.context.found, "atom");
    assert_eq!(err.context.offset, Some(9));
    assert_eq!(err.context.tokens.len(), CONTEXT_TOKENS + 1);
    assert_eq!(err.context.tokens[0], "nope");
    assert_eq!(err.context.tokens[1], ")");
    assert!(err.to_string().starts_with("unknown library `nope`"));
}

#[test]
fn test_error_context_at_end_of_input() {
    let err = compile("(machine m").unwrap_err();
    assert_eq!(err.context.found, "end of input");
    assert!(err.context.tokens.is_empty());
}

// Verification against the paren matcher

#[test]
fn test_verify_closed_rejects_mismatch() {
    let tape = landru_lexer::read("((a b) c)").unwrap();
    let options = CompileOptions::default();
    let compiler = Compiler::new(&tape, &options);
    assert!(compiler
        .verify_closed(TapeCursor::START, TapeCursor::new(7), ExemplarKind::Machine)
        .is_ok());
    let err = compiler
        .verify_closed(TapeCursor::START, TapeCursor::new(5), ExemplarKind::Machine)
        .unwrap_err();
    assert_eq!(
        err.kind,
        CompileErrorKind::NotProperlyClosed {
            construct: ExemplarKind::Machine
        }
    );
    assert_eq!(err.kind.to_string(), "machine not properly closed");
}

#[test]
fn test_successful_compiles_are_balanced() {
    for source in [
        "(machine m (state main ()))",
        "(set e 3.0)(machine m (set e 4.0) (state main (io.print e)))",
        "(machine pingpong (state ping (goto pong)) (state pong (goto ping)) (state main (goto ping)))",
    ] {
        let tape = landru_lexer::read(source).unwrap();
        assert!(is_balanced(&tape));
        assert!(compile_program(tape).is_ok(), "failed: {source}");
    }
}

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_balance {
    use crate::{compile_program, is_balanced};
    use proptest::prelude::*;

    const PROGRAM: &str = "(require io)(machine m (set x 1) (state main (io.print (math.add x 2)) \
                           (on time.after 1 (goto done))) (state done ()))(launch m)";

    proptest! {
        #[test]
        fn injected_bracket_never_compiles(position in 0usize..=PROGRAM.len(), open in any::<bool>()) {
            // Only split at char boundaries outside atoms and strings.
            prop_assume!(PROGRAM.is_char_boundary(position));
            prop_assume!(position == 0
                || position == PROGRAM.len()
                || PROGRAM.as_bytes()[position - 1] == b' '
                || matches!(PROGRAM.as_bytes()[position], b'(' | b')'));

            let mut source = PROGRAM.to_string();
            source.insert(position, if open { '(' } else { ')' });
            let tape = landru_lexer::read(&source).unwrap();

            prop_assert!(!is_balanced(&tape));
            prop_assert!(compile_program(tape).is_err());
        }

        #[test]
        fn arbitrary_bracket_soup_terminates(
            brackets in proptest::collection::vec(prop_oneof![Just('('), Just(')'), Just('a')], 0..64)
        ) {
            let source: String = brackets.iter().flat_map(|c| [*c, ' ']).collect();
            let tape = landru_lexer::read(&source).unwrap();
            let balanced = is_balanced(&tape);
            if compile_program(tape).is_ok() {
                prop_assert!(balanced);
            }
        }
    }
}
