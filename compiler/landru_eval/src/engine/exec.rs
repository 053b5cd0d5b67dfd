//! Running instruction lists.

use std::rc::Rc;

use landru_ir::{Constant, ExemplarId, ExemplarKind, Instruction, Name, ValueSource};
use landru_stack::ensure_sufficient_stack;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::{Engine, PendingLaunch, PendingTransition};
use crate::errors::{
    module_not_required, recursion_limit_exceeded, undefined_condition, undefined_function,
    undefined_state, wrong_arg_count,
};
use crate::registry::module_of;
use crate::scope::{LocalContext, PendingCallback};
use crate::{MachineInstance, RuntimeResult, Value};

type Args = SmallVec<[Value; 2]>;

/// How an instruction list ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Flow {
    Completed,
    /// A `goto` or `launch` ended a state or handler run.
    Suspended,
}

impl Engine {
    /// Execute an exemplar's instructions and return the last value.
    ///
    /// State and handler runs stop right after a `goto` or `launch`; every
    /// other list runs to the end. Stopping at a `launch` parks the
    /// instance in its current state.
    pub(super) fn run_list(
        &mut self,
        inst: &mut MachineInstance,
        owner: ExemplarId,
    ) -> RuntimeResult<(Flow, Value)> {
        let program = Rc::clone(&self.program);
        let exemplar = program.arena.get(owner);
        let suspends = matches!(exemplar.kind, ExemplarKind::State | ExemplarKind::On);
        let mut last = Value::Nil;
        for instruction in &exemplar.instructions {
            self.executed += 1;
            last = self.exec(inst, instruction)?;
            if suspends && instruction.is_transfer() {
                if matches!(instruction, Instruction::Launch(_)) {
                    inst.parked = true;
                }
                return Ok((Flow::Suspended, Value::Nil));
            }
        }
        Ok((Flow::Completed, last))
    }

    fn exec(&mut self, inst: &mut MachineInstance, instruction: &Instruction) -> RuntimeResult<Value> {
        match instruction {
            Instruction::Launch(name) => {
                let machine = self.find_machine(inst, *name)?;
                trace!(instance = %inst.id, machine = self.program.name(*name), "launch queued");
                self.pending_launches.push_back(PendingLaunch {
                    machine,
                    parent: inst.id,
                });
                Ok(Value::Nil)
            }
            Instruction::Goto(target) => {
                trace!(instance = %inst.id, state = self.program.name(*target), "goto queued");
                inst.transition_queued = true;
                self.pending_transitions.push_back(PendingTransition {
                    instance: inst.id,
                    target: *target,
                });
                Ok(Value::Nil)
            }
            Instruction::SetVar(name, source) => {
                let value = self.eval(inst, source)?;
                self.declare_or_assign(inst, *name, value.clone());
                Ok(value)
            }
            Instruction::Shared(name, default) => {
                let key = (inst.machine, *name);
                if !self.shared.retain(key) {
                    let value = self.eval(inst, default)?;
                    self.shared.create(key, value);
                }
                inst.shared_refs.push(key);
                Ok(Value::Nil)
            }
            Instruction::Call(name, sources) => {
                let mut args = Args::with_capacity(sources.len());
                for source in sources {
                    args.push(self.eval(inst, source)?);
                }
                self.call(inst, *name, args)
            }
        }
    }

    /// Evaluate an argument or assigned value.
    pub(super) fn eval(
        &mut self,
        inst: &mut MachineInstance,
        source: &ValueSource,
    ) -> RuntimeResult<Value> {
        match *source {
            ValueSource::Constant(Constant::Atom(name)) => self.read(inst, name),
            ValueSource::Constant(constant) => {
                Ok(Value::from_literal(constant, &self.program.interner).unwrap_or_default())
            }
            ValueSource::Nested(inner) => {
                ensure_sufficient_stack(|| self.run_list(inst, inner)).map(|(_, value)| value)
            }
        }
    }

    /// Call a script function or, for dotted names, a library function.
    fn call(&mut self, inst: &mut MachineInstance, name: Name, args: Args) -> RuntimeResult<Value> {
        if let Some(function) = self.find_function(inst, name) {
            return self.call_script(inst, function, args);
        }
        let program = Rc::clone(&self.program);
        let text = program.name(name);
        if let Some(module) = module_of(text) {
            if !self.required.contains(module) {
                return Err(module_not_required(module).into());
            }
            if let Some(native) = self.registry.function(text) {
                return Ok(native(&args)?);
            }
        }
        Err(undefined_function(text).into())
    }

    fn call_script(
        &mut self,
        inst: &mut MachineInstance,
        function: ExemplarId,
        args: Args,
    ) -> RuntimeResult<Value> {
        let program = Rc::clone(&self.program);
        let exemplar = program.arena.get(function);
        if args.len() != exemplar.params.len() {
            let name = program.name(exemplar.name);
            return Err(wrong_arg_count(name, exemplar.params.len(), args.len()).into());
        }
        let limit = self.config.call_depth_limit();
        if inst.call_depth >= limit {
            return Err(recursion_limit_exceeded(limit));
        }

        let mut frame = LocalContext::frame(function, exemplar.pure);
        frame.vars.extend(exemplar.params.iter().copied().zip(args));
        inst.scope_stack.push(frame);
        inst.call_depth += 1;
        let result = ensure_sufficient_stack(|| self.run_list(inst, function));
        inst.call_depth -= 1;
        inst.scope_stack.pop();
        result.map(|(_, value)| value)
    }

    /// Launch a machine: run its own instructions, then enter `main`.
    pub(super) fn initialize(&mut self, inst: &mut MachineInstance) -> RuntimeResult<()> {
        let machine = inst.machine;
        self.run_list(inst, machine)?;
        let program = Rc::clone(&self.program);
        let main = program
            .interner
            .get("main")
            .and_then(|main| {
                program
                    .arena
                    .nested_of_kind(machine, main, ExemplarKind::State)
            })
            .ok_or_else(|| undefined_state("main"))?;
        self.enter_state(inst, main)
    }

    /// Follow a serviced `goto`.
    pub(super) fn transition(&mut self, inst: &mut MachineInstance, target: Name) -> RuntimeResult<()> {
        inst.transition_queued = false;
        inst.parked = false;
        let state = self.find_state(inst, target)?;
        let parent = self.program.arena.get(state).parent;
        while let Some(top) = inst.scope_stack.last() {
            if Some(top.exemplar) == parent {
                break;
            }
            inst.scope_stack.pop();
        }
        debug!(instance = %inst.id, state = self.program.name(target), "transition");
        self.enter_state(inst, state)
    }

    /// Push a state's context, register its handlers, then run it.
    fn enter_state(&mut self, inst: &mut MachineInstance, state: ExemplarId) -> RuntimeResult<()> {
        inst.scope_stack.push(LocalContext::state(state));
        let program = Rc::clone(&self.program);
        for &handler in &program.arena.get(state).event_handlers {
            self.register_callback(inst, handler)?;
        }
        self.run_list(inst, state)?;
        Ok(())
    }

    fn register_callback(&mut self, inst: &mut MachineInstance, handler: ExemplarId) -> RuntimeResult<()> {
        let program = Rc::clone(&self.program);
        let exemplar = program.arena.get(handler);
        let kind = program.name(exemplar.name);
        if let Some(module) = module_of(kind) {
            if !self.required.contains(module) {
                return Err(module_not_required(module).into());
            }
        }
        if self.registry.condition(kind).is_none() {
            return Err(undefined_condition(kind).into());
        }
        let arg = match exemplar.condition_arg {
            Some(constant) => self.eval(inst, &ValueSource::Constant(constant))?,
            None => Value::Nil,
        };
        let callback = PendingCallback {
            handler,
            condition: exemplar.name,
            arg,
            registered_at: self.now,
        };
        if let Some(top) = inst.scope_stack.last_mut() {
            top.callbacks.push(callback);
        }
        Ok(())
    }
}
