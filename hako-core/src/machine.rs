use crate::component::{Component, ComponentId};
use crate::cpu::{Core, CpuResult, StepStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    Halted { steps: u64 },
    StepLimitReached { steps: u64 },
}

/// Drives a core: one `step()` at a time, with device updates in between.
#[derive(Debug)]
pub struct Machine<C: Core> {
    id: ComponentId,
    core: C,
    steps: u64,
}

impl<C: Core + 'static> Component for Machine<C> {
    fn id(&self) -> &ComponentId {
        &self.id
    }
}

impl<C: Core> Machine<C> {
    pub fn new(name: &str, core: C) -> Self {
        Self {
            id: ComponentId::new(name),
            core,
            steps: 0,
        }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    pub fn into_core(self) -> C {
        self.core
    }

    /// Steps executed so far, counting the one that halted.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Executes one instruction, then gives every device its `update` tick.
    pub fn step(&mut self) -> CpuResult<StepStatus> {
        let status = self.core.step()?;
        self.steps += 1;
        self.core.mmu_mut().update_devices();
        Ok(status)
    }

    /// Steps until the core halts or `step_limit` more steps have run. Errors stop the run and
    /// are handed back unchanged.
    pub fn run(&mut self, step_limit: Option<u64>) -> CpuResult<RunOutcome> {
        tracing::info!("starting {}", self.id);
        let mut remaining = step_limit;
        loop {
            if remaining == Some(0) {
                tracing::info!("{} reached its step limit after {} steps", self.id, self.steps);
                return Ok(RunOutcome::StepLimitReached { steps: self.steps });
            }
            if self.step()? == StepStatus::Halted {
                tracing::info!("{} halted after {} steps", self.id, self.steps);
                return Ok(RunOutcome::Halted { steps: self.steps });
            }
            remaining = remaining.map(|steps| steps - 1);
        }
    }
}
