//! The cooperative tick scheduler.
//!
//! An engine owns a compiled program and every instance launched from it.
//! Nothing runs until the host calls [`Engine::run_tick`]; each tick
//! services the launches and transitions queued during the previous tick,
//! polls pending callbacks, and removes retired instances. Launches and
//! transitions requested during a tick always wait for the next one.

mod exec;
mod resolve;
mod tick;

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use landru_ir::{ExemplarId, Name, Program};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{undefined_machine, undefined_variable};
use crate::shared::SharedCells;
use crate::{
    stdout_handler, Clock, EngineConfig, InstanceFault, InstanceId, InstanceState,
    LibraryRegistry, MachineInstance, NameError, SharedPrintHandler, Value,
};

pub use tick::{RunSummary, TickReport};

/// A launch waiting for the next tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingLaunch {
    machine: ExemplarId,
    parent: InstanceId,
}

/// A `goto` waiting for the next tick. The target is looked up when the
/// transition is serviced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingTransition {
    instance: InstanceId,
    target: Name,
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    program: Program,
    registry: Option<LibraryRegistry>,
    clock: Option<Clock>,
    print_handler: Option<SharedPrintHandler>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(program: Program) -> Self {
        EngineBuilder {
            program,
            registry: None,
            clock: None,
            print_handler: None,
            config: EngineConfig::default(),
        }
    }

    /// Libraries available to the program. Defaults to the standard
    /// libraries printing through the engine's print handler.
    #[must_use]
    pub fn registry(mut self, registry: LibraryRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Defaults to the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine {
        let print = self.print_handler.unwrap_or_else(stdout_handler);
        let registry = self
            .registry
            .unwrap_or_else(|| LibraryRegistry::standard(print.clone()));
        let required = self
            .program
            .required_library_names()
            .map(str::to_string)
            .collect();
        let root = MachineInstance::new(InstanceId::ROOT, self.program.root, None);
        let mut instances = BTreeMap::new();
        instances.insert(InstanceId::ROOT, root);

        Engine {
            program: Rc::new(self.program),
            registry,
            required,
            clock: self.clock.unwrap_or_default(),
            print,
            config: self.config,
            instances,
            globals: FxHashMap::default(),
            shared: SharedCells::new(),
            pending_launches: VecDeque::new(),
            pending_transitions: VecDeque::new(),
            next_id: 1,
            tick: 0,
            created: 0,
            started: false,
            now: Duration::ZERO,
            executed: 0,
        }
    }
}

pub struct Engine {
    program: Rc<Program>,
    registry: LibraryRegistry,
    /// Modules named by the program's `require`s.
    required: FxHashSet<String>,
    clock: Clock,
    print: SharedPrintHandler,
    config: EngineConfig,
    /// Every existing instance, the root included.
    instances: BTreeMap<InstanceId, MachineInstance>,
    globals: FxHashMap<Name, Value>,
    shared: SharedCells,
    pending_launches: VecDeque<PendingLaunch>,
    pending_transitions: VecDeque<PendingTransition>,
    next_id: u64,
    tick: u64,
    created: u64,
    started: bool,
    /// Clock reading taken at the start of the current tick.
    now: Duration,
    /// Instructions executed in the current tick.
    executed: usize,
}

impl Engine {
    /// Build an engine with the standard libraries, stdout and the system
    /// clock.
    pub fn new(program: Program) -> Self {
        EngineBuilder::new(program).build()
    }

    pub fn builder(program: Program) -> EngineBuilder {
        EngineBuilder::new(program)
    }

    /// Run the program's top-level instructions: globals and the initial
    /// launches. Does nothing if already started.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn start(&mut self) -> Result<(), InstanceFault> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.now = self.clock.now();
        let root = self.program.root;
        self.with_instance(InstanceId::ROOT, |engine, inst| {
            inst.state = InstanceState::Ready;
            let result = engine.run_list(inst, root).map(drop);
            inst.settle();
            result.map_err(|error| engine.fault(inst, error))
        })
        .unwrap_or(Ok(()))
    }

    /// Queue a launch of a top-level machine, parented to the root.
    pub fn launch(&mut self, machine: &str) -> Result<(), NameError> {
        let exemplar = self
            .program
            .machine(machine)
            .ok_or_else(|| undefined_machine(machine))?;
        self.pending_launches.push_back(PendingLaunch {
            machine: exemplar,
            parent: InstanceId::ROOT,
        });
        Ok(())
    }

    /// Retire an instance now. Its callbacks and queued transition are
    /// dropped and its shared references released; instances it launched
    /// keep running. Returns `false` for the root or an unknown id.
    pub fn terminate(&mut self, id: InstanceId) -> bool {
        if id.is_root() || !self.instances.contains_key(&id) {
            return false;
        }
        self.pending_transitions.retain(|t| t.instance != id);
        self.retire(id);
        true
    }

    /// No live machines and nothing queued.
    pub fn is_halted(&self) -> bool {
        self.started
            && self.pending_launches.is_empty()
            && self.pending_transitions.is_empty()
            && self.live().next().is_none()
    }

    // Introspection

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Instances ever created, the root excluded.
    pub fn total_instances_created(&self) -> u64 {
        self.created
    }

    /// Live machine instances in creation order.
    pub fn live_instances(&self) -> Vec<InstanceId> {
        self.live().map(|inst| inst.id).collect()
    }

    /// Live instances of the machine named `machine`.
    pub fn instance_count_of(&self, machine: &str) -> usize {
        self.live()
            .filter(|inst| self.exemplar_name(inst.machine) == machine)
            .count()
    }

    pub fn status(&self, id: InstanceId) -> InstanceState {
        self.instances
            .get(&id)
            .map_or(InstanceState::Gone, |inst| inst.state)
    }

    /// Machine name of an instance.
    pub fn machine_of(&self, id: InstanceId) -> Option<&str> {
        let inst = self.instances.get(&id)?;
        Some(self.exemplar_name(inst.machine))
    }

    /// Name of the innermost active state.
    pub fn current_state(&self, id: InstanceId) -> Option<&str> {
        let state = self.instances.get(&id)?.current_state()?;
        Some(self.exemplar_name(state))
    }

    /// Active state names, outermost first.
    pub fn state_path(&self, id: InstanceId) -> Vec<&str> {
        self.instances.get(&id).map_or_else(Vec::new, |inst| {
            inst.scope_stack
                .iter()
                .filter(|ctx| !ctx.is_frame())
                .map(|ctx| self.exemplar_name(ctx.exemplar))
                .collect()
        })
    }

    /// Read a variable the way code running in the instance would see it.
    pub fn read_variable(&self, id: InstanceId, name: &str) -> Option<Value> {
        let inst = self.instances.get(&id)?;
        let name = self.program.interner.get(name)?;
        let slot = self.resolve(inst, name).ok()?;
        Some(self.read_slot(inst, name, slot))
    }

    pub fn read_global(&self, name: &str) -> Option<Value> {
        let name = self.program.interner.get(name)?;
        self.globals.get(&name).cloned()
    }

    /// Current value of a machine type's shared variable, if any instance
    /// holds it.
    pub fn shared_value(&self, machine: &str, name: &str) -> Option<Value> {
        let machine = self.program.machine(machine)?;
        let name = self.program.interner.get(name)?;
        self.shared.get((machine, name)).cloned()
    }

    /// Live references on a machine type's shared variable.
    pub fn shared_refcount(&self, machine: &str, name: &str) -> u32 {
        let (Some(machine), Some(name)) =
            (self.program.machine(machine), self.program.interner.get(name))
        else {
            return 0;
        };
        self.shared.refcount((machine, name))
    }

    /// Write an existing variable through an instance's resolution chain.
    pub fn assign_variable(
        &mut self,
        id: InstanceId,
        name: &str,
        value: Value,
    ) -> Result<(), NameError> {
        let interned = self
            .program
            .interner
            .get(name)
            .ok_or_else(|| undefined_variable(name))?;
        self.with_instance(id, |engine, inst| {
            let slot = engine.resolve(inst, interned)?;
            if engine.write_slot(inst, interned, slot, value) {
                Ok(())
            } else {
                Err(undefined_variable(name))
            }
        })
        .unwrap_or_else(|| Err(undefined_variable(name)))
    }

    // Internals

    fn live(&self) -> impl Iterator<Item = &MachineInstance> {
        self.instances
            .values()
            .filter(|inst| !inst.is_root() && inst.state != InstanceState::Retiring)
    }

    fn exemplar_name(&self, id: ExemplarId) -> &str {
        self.program.name(self.program.arena.get(id).name)
    }

    /// Run `f` with an instance taken out of the instance table, so the
    /// engine and the instance can be borrowed mutably together.
    fn with_instance<R>(
        &mut self,
        id: InstanceId,
        f: impl FnOnce(&mut Self, &mut MachineInstance) -> R,
    ) -> Option<R> {
        let mut inst = self.instances.remove(&id)?;
        let result = f(self, &mut inst);
        self.instances.insert(id, inst);
        Some(result)
    }

    fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_id);
        self.next_id += 1;
        self.created += 1;
        id
    }

    /// Stop an instance after an error and describe what happened.
    fn fault(&mut self, inst: &mut MachineInstance, error: crate::RuntimeError) -> InstanceFault {
        let machine = self.exemplar_name(inst.machine).to_string();
        tracing::error!(instance = %inst.id, machine = %machine, %error, "instance faulted");
        inst.halt();
        let id = inst.id;
        self.pending_transitions.retain(|t| t.instance != id);
        InstanceFault {
            instance: id,
            machine,
            error,
        }
    }

    /// Remove an instance and release its shared references.
    fn retire(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.remove(&id) else {
            return;
        };
        for key in inst.shared_refs {
            if self.shared.release(key) {
                tracing::trace!(instance = %id, "shared cell freed");
            }
        }
        tracing::debug!(instance = %id, "retired");
    }
}
