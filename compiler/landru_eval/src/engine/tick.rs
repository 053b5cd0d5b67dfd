//! One scheduler tick and the host's run loop.

use std::rc::Rc;

use tracing::{debug, trace};

use super::exec::Flow;
use super::{Engine, PendingLaunch, PendingTransition};
use crate::errors::undefined_condition;
use crate::{InstanceFault, InstanceId, InstanceState, MachineInstance, RuntimeResult};

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub launched: usize,
    pub transitioned: usize,
    pub callbacks_fired: usize,
    pub retired: usize,
    pub instructions_executed: usize,
    pub faults: Vec<InstanceFault>,
}

/// Result of [`Engine::run_until_halted`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub halted: bool,
    pub faults: Vec<InstanceFault>,
}

impl Engine {
    /// Advance the scheduler by one tick.
    ///
    /// Launches and transitions queued before the tick are serviced in
    /// FIFO order; anything queued while servicing them waits for the next
    /// tick. Suspended instances then poll their callbacks, and instances
    /// that finished are removed.
    #[tracing::instrument(level = "debug", skip_all, fields(tick = self.tick + 1))]
    pub fn run_tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if !self.started {
            if let Err(fault) = self.start() {
                report.faults.push(fault);
            }
        }
        self.tick += 1;
        self.now = self.clock.now();
        self.executed = 0;
        report.tick = self.tick;

        let take = self
            .config
            .launch_cap()
            .map_or(self.pending_launches.len(), |cap| cap.min(self.pending_launches.len()));
        let launches: Vec<PendingLaunch> = self.pending_launches.drain(..take).collect();
        let transitions: Vec<PendingTransition> = self.pending_transitions.drain(..).collect();

        for launch in launches {
            report.launched += 1;
            if let Err(fault) = self.instantiate(launch) {
                report.faults.push(fault);
            }
        }

        for transition in transitions {
            if let Some(Err(fault)) = self.service_transition(transition, &mut report) {
                report.faults.push(fault);
            }
        }

        let ids: Vec<InstanceId> = self.instances.keys().copied().collect();
        for id in ids {
            if let Some(Err(fault)) = self.poll_callbacks(id, &mut report) {
                report.faults.push(fault);
            }
        }

        let retiring: Vec<InstanceId> = self
            .instances
            .values()
            .filter(|inst| inst.state == InstanceState::Retiring)
            .map(|inst| inst.id)
            .collect();
        for id in retiring {
            self.retire(id);
            report.retired += 1;
        }

        report.instructions_executed = self.executed;
        debug!(
            launched = report.launched,
            transitioned = report.transitioned,
            callbacks = report.callbacks_fired,
            retired = report.retired,
            live = self.live().count(),
            "tick complete"
        );
        report
    }

    /// Run ticks until the engine halts or `max_ticks` have run.
    pub fn run_until_halted(&mut self, max_ticks: u64) -> RunSummary {
        let mut summary = RunSummary::default();
        while summary.ticks < max_ticks && !self.is_halted() {
            let report = self.run_tick();
            summary.ticks += 1;
            summary.faults.extend(report.faults);
        }
        summary.halted = self.is_halted();
        summary
    }

    fn instantiate(&mut self, launch: PendingLaunch) -> Result<InstanceId, InstanceFault> {
        let id = self.allocate_id();
        let mut inst = MachineInstance::new(id, launch.machine, Some(launch.parent));
        debug!(
            instance = %id,
            parent = %launch.parent,
            machine = self.exemplar_name(launch.machine),
            "launch"
        );
        inst.state = InstanceState::Ready;
        let outcome = match self.initialize(&mut inst) {
            Ok(()) => {
                inst.settle();
                Ok(id)
            }
            Err(error) => Err(self.fault(&mut inst, error)),
        };
        // Inserted even on failure so its shared references are released
        // with the rest of the tick's retirements.
        self.instances.insert(id, inst);
        outcome
    }

    /// `None` if the instance no longer exists or already faulted.
    fn service_transition(
        &mut self,
        transition: PendingTransition,
        report: &mut TickReport,
    ) -> Option<Result<(), InstanceFault>> {
        self.with_instance(transition.instance, |engine, inst| {
            if inst.state == InstanceState::Retiring {
                return None;
            }
            report.transitioned += 1;
            inst.state = InstanceState::Ready;
            Some(match engine.transition(inst, transition.target) {
                Ok(()) => {
                    inst.settle();
                    Ok(())
                }
                Err(error) => Err(engine.fault(inst, error)),
            })
        })
        .flatten()
    }

    /// `None` if the instance has nothing to poll this tick.
    fn poll_callbacks(
        &mut self,
        id: InstanceId,
        report: &mut TickReport,
    ) -> Option<Result<(), InstanceFault>> {
        self.with_instance(id, |engine, inst| {
            if inst.state != InstanceState::Suspended
                || inst.transition_queued
                || !inst.has_pending_callbacks()
            {
                return None;
            }
            inst.state = InstanceState::Ready;
            Some(match engine.fire_ready_callbacks(inst, report) {
                Ok(()) => {
                    inst.settle();
                    Ok(())
                }
                Err(error) => Err(engine.fault(inst, error)),
            })
        })
        .flatten()
    }

    /// Run every satisfied callback once, outermost context first and in
    /// registration order, stopping as soon as one queues a transition.
    fn fire_ready_callbacks(
        &mut self,
        inst: &mut MachineInstance,
        report: &mut TickReport,
    ) -> RuntimeResult<()> {
        let program = Rc::clone(&self.program);
        let mut depth = 0;
        while depth < inst.scope_stack.len() {
            let mut index = 0;
            while let Some(callback) = inst.scope_stack[depth].callbacks.get(index) {
                let kind = program.name(callback.condition);
                let elapsed = self.now.saturating_sub(callback.registered_at);
                let satisfied = self
                    .registry
                    .is_satisfied(kind, &callback.arg, elapsed)
                    .ok_or_else(|| undefined_condition(kind))??;
                if !satisfied {
                    index += 1;
                    continue;
                }
                let callback = inst.scope_stack[depth].callbacks.remove(index);
                report.callbacks_fired += 1;
                trace!(instance = %inst.id, condition = kind, "callback fired");
                let (flow, _) = self.run_list(inst, callback.handler)?;
                if flow == Flow::Suspended && inst.transition_queued {
                    return Ok(());
                }
            }
            depth += 1;
        }
        Ok(())
    }
}
