//! Scenario builder API.
//!
//! Provides a declarative API for scripted runs that enforce the Oracle
//! Pattern: a scenario cannot be run without a final verification, and the
//! structural invariants are checked after every operation.

use std::time::Duration;

use authsim_core::{SimulationCommand, StepCatalog};

use crate::{Operation, SimScheduler, oracle::check_invariants};

/// Final verification of a scenario.
pub type OracleFn = Box<dyn Fn(&SimScheduler) -> Result<(), String>>;

/// Scenario builder.
///
/// Must call `.oracle()` to get a [`RunnableScenario`] that can be executed.
pub struct Scenario {
    name: String,
    catalog: StepCatalog,
    operations: Vec<Operation>,
}

impl Scenario {
    /// Create a scenario over `catalog`.
    pub fn new(name: impl Into<String>, catalog: StepCatalog) -> Self {
        Self { name: name.into(), catalog, operations: Vec::new() }
    }

    /// Issue Start.
    pub fn start(mut self) -> Self {
        self.operations.push(Operation::Start);
        self
    }

    /// Issue Pause.
    pub fn pause(mut self) -> Self {
        self.operations.push(Operation::Pause);
        self
    }

    /// Issue Reset.
    pub fn reset(mut self) -> Self {
        self.operations.push(Operation::Reset);
        self
    }

    /// Let `millis` of virtual time pass.
    pub fn wait(mut self, millis: u16) -> Self {
        self.operations.push(Operation::AdvanceTime { millis });
        self
    }

    /// Attach the final check. Only a scenario with a check can run.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// Scenario with its final check attached.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario on a fresh [`SimScheduler`].
    pub fn run(self) -> Result<(), String> {
        let name = self.scenario.name;
        let mut sim = SimScheduler::new(self.scenario.catalog);

        for (i, op) in self.scenario.operations.iter().enumerate() {
            match *op {
                Operation::Start => sim.apply(SimulationCommand::Start),
                Operation::Pause => sim.apply(SimulationCommand::Pause),
                Operation::Reset => sim.apply(SimulationCommand::Reset),
                Operation::AdvanceTime { millis } => {
                    sim.advance(Duration::from_millis(u64::from(millis)));
                },
            }

            check_invariants(&sim.snapshot())
                .map_err(|e| format!("Scenario '{name}': after operation {i} ({op:?}): {e}"))?;
        }

        tracing::debug!(scenario = %name, now = ?sim.now(), "scenario finished, running oracle");
        (self.oracle)(&sim).map_err(|e| format!("Scenario '{name}': oracle failed: {e}"))
    }
}
