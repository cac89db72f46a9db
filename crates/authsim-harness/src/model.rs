//! Reference model of the simulation's observable behaviour.
//!
//! The model tracks remaining time on the current step directly instead of
//! arming timers, so it shares no code with the engine. Property tests drive
//! both with the same [`Operation`] sequence and compare what they report.

use arbitrary::{Arbitrary, Unstructured};
use authsim_core::{StepCatalog, StepStatus};

/// Operations applied to both model and real engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Issue Start.
    Start,
    /// Issue Pause.
    Pause,
    /// Issue Reset.
    Reset,
    /// Let virtual time pass.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}

/// Decode an operation sequence from raw bytes.
///
/// Every byte string decodes to some sequence, so fuzzer or proptest byte
/// inputs map directly onto runs. Decoding stops at the first operation the
/// remaining bytes cannot complete.
pub fn operations_from_bytes(data: &[u8]) -> Vec<Operation> {
    let mut input = Unstructured::new(data);
    let mut operations = Vec::new();

    while !input.is_empty() {
        match Operation::arbitrary(&mut input) {
            Ok(operation) => operations.push(operation),
            Err(_) => break,
        }
    }
    operations
}

/// Reference model.
#[derive(Debug, Clone)]
pub struct ModelSimulation {
    durations: Vec<u64>,
    index: usize,
    running: bool,
    /// Whether the step at `index` has been marked Active since the last reset.
    activated: bool,
    /// Milliseconds until the current step completes, while running.
    remaining: u64,
}

impl ModelSimulation {
    /// Model for `catalog`, Idle.
    pub fn new(catalog: &StepCatalog) -> Self {
        let durations = catalog
            .iter()
            .map(|step| u64::try_from(step.nominal_duration.as_millis()).unwrap_or(u64::MAX))
            .collect();
        Self { durations, index: 0, running: false, activated: false, remaining: 0 }
    }

    /// Current step index.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Whether the model is playing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Expected status of every step.
    pub fn statuses(&self) -> Vec<StepStatus> {
        (0..self.durations.len())
            .map(|i| {
                if i < self.index {
                    StepStatus::Completed
                } else if i == self.index && self.activated {
                    StepStatus::Active
                } else {
                    StepStatus::Pending
                }
            })
            .collect()
    }

    /// Apply an operation.
    pub fn apply(&mut self, op: Operation) {
        match op {
            Operation::Start => self.start(),
            Operation::Pause => self.running = false,
            Operation::Reset => self.reset(),
            Operation::AdvanceTime { millis } => self.advance(u64::from(millis)),
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.running = false;
        self.activated = false;
        self.remaining = 0;
    }

    fn start(&mut self) {
        if self.index >= self.durations.len() {
            self.reset();
            return;
        }
        if !self.running {
            self.running = true;
            self.activated = true;
            self.remaining = self.durations[self.index];
        }
    }

    fn advance(&mut self, mut millis: u64) {
        while self.running && millis >= self.remaining {
            millis -= self.remaining;
            self.index += 1;
            if self.index >= self.durations.len() {
                self.running = false;
                self.activated = false;
                return;
            }
            self.remaining = self.durations[self.index];
        }
        if self.running {
            self.remaining -= millis;
        }
    }
}
