//! Exemplar tree printer, used by `landru dump`.

use std::fmt::Write;

use landru_ir::{ExemplarId, ExemplarKind, Instruction, Program, ValueSource};

/// Render the program's exemplar tree, two spaces per level.
///
/// Children appear in source order so output is stable.
pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();
    for lib in program.required_library_names() {
        let _ = writeln!(out, "require {lib}");
    }
    dump_exemplar(program, program.root, 0, &mut out);
    out
}

fn dump_exemplar(program: &Program, id: ExemplarId, depth: usize, out: &mut String) {
    let ex = program.arena.get(id);
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{}", ex.kind);
    match ex.kind {
        ExemplarKind::Root => {}
        ExemplarKind::Function => {
            let params: Vec<&str> = ex.params.iter().map(|&p| program.name(p)).collect();
            let keyword = if ex.pure { "defun" } else { "defum" };
            let _ = write!(out, " {} ({keyword} {})", program.name(ex.name), params.join(" "));
        }
        ExemplarKind::On => {
            let _ = write!(out, " {}", program.name(ex.name));
            if let Some(arg) = &ex.condition_arg {
                let _ = write!(out, " {}", arg.display(&program.interner));
            }
        }
        _ => {
            let _ = write!(out, " {}", program.name(ex.name));
        }
    }
    out.push('\n');

    let mut children: Vec<ExemplarId> = ex
        .nested_machines
        .values()
        .chain(ex.nested_functions.values())
        .copied()
        .collect();
    children.sort_by_key(|&c| program.arena.get(c).offset);
    for child in children {
        dump_exemplar(program, child, depth + 1, out);
    }
    for &handler in &ex.event_handlers {
        dump_exemplar(program, handler, depth + 1, out);
    }
    for instruction in &ex.instructions {
        dump_instruction(program, instruction, depth + 1, out);
    }
}

fn dump_instruction(program: &Program, instruction: &Instruction, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let (target, values): (_, &[ValueSource]) = match instruction {
        Instruction::Launch(name) | Instruction::Goto(name) => (*name, &[]),
        Instruction::SetVar(name, value) | Instruction::Shared(name, value) => {
            (*name, std::slice::from_ref(value))
        }
        Instruction::Call(name, args) => (*name, args.as_slice()),
    };
    let _ = write!(out, "{indent}{} {}", instruction.keyword(), program.name(target));
    let mut nested = Vec::new();
    for value in values {
        match value {
            ValueSource::Constant(c) => {
                let _ = write!(out, " {}", c.display(&program.interner));
            }
            ValueSource::Nested(id) => {
                let _ = write!(out, " <{}>", program.arena.get(*id).kind);
                nested.push(*id);
            }
        }
    }
    out.push('\n');
    for id in nested {
        for inner in &program.arena.get(id).instructions {
            dump_instruction(program, inner, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests;
