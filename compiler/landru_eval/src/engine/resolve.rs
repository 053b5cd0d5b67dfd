//! Name resolution for variables, functions, machines and states.
//!
//! Variables resolve innermost first: the instance's local contexts from
//! the top of the stack down, its instance variables, the shared cells of
//! its machine lineage, required module values, then globals.

use landru_ir::{ExemplarId, ExemplarKind, Name};

use super::Engine;
use crate::errors::{module_not_required, undefined_machine, undefined_state, undefined_variable};
use crate::registry::module_of;
use crate::scope::LocalContext;
use crate::shared::SharedKey;
use crate::{MachineInstance, NameError, RuntimeResult, Value};

/// Where a variable lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Slot {
    /// Index into the scope stack.
    Local(usize),
    Instance,
    Shared(SharedKey),
    /// Read-only library value.
    Module,
    Global,
}

impl Engine {
    pub(super) fn resolve(&self, inst: &MachineInstance, name: Name) -> Result<Slot, NameError> {
        if let Some(depth) = inst
            .scope_stack
            .iter()
            .rposition(|ctx| ctx.vars.contains_key(&name))
        {
            return Ok(Slot::Local(depth));
        }
        if !inst.is_root() && inst.vars.contains_key(&name) {
            return Ok(Slot::Instance);
        }
        if let Some(key) = self
            .machine_lineage(inst.machine)
            .map(|machine| (machine, name))
            .find(|&key| self.shared.contains(key))
        {
            return Ok(Slot::Shared(key));
        }
        let text = self.program.name(name);
        let module = module_of(text);
        if let Some(module) = module {
            if self.required.contains(module) && self.registry.value(text).is_some() {
                return Ok(Slot::Module);
            }
        }
        if self.globals.contains_key(&name) {
            return Ok(Slot::Global);
        }
        match module {
            Some(module) if !self.required.contains(module) => Err(module_not_required(module)),
            _ => Err(undefined_variable(text)),
        }
    }

    pub(super) fn read(&self, inst: &MachineInstance, name: Name) -> RuntimeResult<Value> {
        let slot = self.resolve(inst, name)?;
        Ok(self.read_slot(inst, name, slot))
    }

    pub(super) fn read_slot(&self, inst: &MachineInstance, name: Name, slot: Slot) -> Value {
        let value = match slot {
            Slot::Local(depth) => inst.scope_stack.get(depth).and_then(|ctx| ctx.vars.get(&name)),
            Slot::Instance => inst.vars.get(&name),
            Slot::Shared(key) => self.shared.get(key),
            Slot::Module => self.registry.value(self.program.name(name)),
            Slot::Global => self.globals.get(&name),
        };
        value.cloned().unwrap_or_default()
    }

    /// Overwrite a resolved variable. Module values cannot be written.
    pub(super) fn write_slot(
        &mut self,
        inst: &mut MachineInstance,
        name: Name,
        slot: Slot,
        value: Value,
    ) -> bool {
        match slot {
            Slot::Local(depth) => match inst.scope_stack.get_mut(depth) {
                Some(ctx) => {
                    ctx.vars.insert(name, value);
                    true
                }
                None => false,
            },
            Slot::Instance => {
                inst.vars.insert(name, value);
                true
            }
            Slot::Shared(key) => self.shared.set(key, value),
            Slot::Module => false,
            Slot::Global => {
                self.globals.insert(name, value);
                true
            }
        }
    }

    /// `set` semantics.
    ///
    /// Top-level code declares globals and machine-level code declares
    /// instance variables. Inside a state, handler or side-effecting
    /// function an existing binding is written through; otherwise the name
    /// becomes a local of the innermost context. A pure function only ever
    /// writes its own frame.
    pub(super) fn declare_or_assign(&mut self, inst: &mut MachineInstance, name: Name, value: Value) {
        if inst.scope_stack.is_empty() {
            if inst.is_root() {
                self.globals.insert(name, value);
            } else {
                inst.vars.insert(name, value);
            }
            return;
        }
        let pure = inst
            .scope_stack
            .last()
            .is_some_and(LocalContext::is_pure_frame);
        if !pure {
            if let Ok(slot) = self.resolve(inst, name) {
                if slot != Slot::Module {
                    self.write_slot(inst, name, slot, value);
                    return;
                }
            }
        }
        if let Some(top) = inst.scope_stack.last_mut() {
            top.vars.insert(name, value);
        }
    }

    /// Exemplars searched for functions and machines: the active contexts
    /// innermost first, then the instance's machine and its ancestors.
    fn lexical_scopes<'a>(&'a self, inst: &'a MachineInstance) -> impl Iterator<Item = ExemplarId> + 'a {
        inst.scope_stack
            .iter()
            .rev()
            .map(|ctx| ctx.exemplar)
            .chain(std::iter::once(inst.machine))
            .chain(self.program.arena.ancestors(inst.machine))
    }

    /// The machine and every enclosing machine.
    fn machine_lineage(&self, machine: ExemplarId) -> impl Iterator<Item = ExemplarId> + '_ {
        std::iter::once(machine)
            .chain(self.program.arena.ancestors(machine))
            .filter(|&id| self.program.arena.get(id).kind == ExemplarKind::Machine)
    }

    pub(super) fn find_function(&self, inst: &MachineInstance, name: Name) -> Option<ExemplarId> {
        self.lexical_scopes(inst)
            .find_map(|scope| self.program.arena.get(scope).nested_functions.get(&name).copied())
    }

    pub(super) fn find_machine(&self, inst: &MachineInstance, name: Name) -> Result<ExemplarId, NameError> {
        self.lexical_scopes(inst)
            .find_map(|scope| {
                self.program
                    .arena
                    .nested_of_kind(scope, name, ExemplarKind::Machine)
            })
            .ok_or_else(|| undefined_machine(self.program.name(name)))
    }

    /// `goto` targets: states nested in an active context, innermost
    /// first, then the machine's own states.
    pub(super) fn find_state(&self, inst: &MachineInstance, name: Name) -> Result<ExemplarId, NameError> {
        inst.scope_stack
            .iter()
            .rev()
            .filter(|ctx| !ctx.is_frame())
            .map(|ctx| ctx.exemplar)
            .chain(std::iter::once(inst.machine))
            .find_map(|scope| {
                self.program
                    .arena
                    .nested_of_kind(scope, name, ExemplarKind::State)
            })
            .ok_or_else(|| undefined_state(self.program.name(name)))
    }
}
