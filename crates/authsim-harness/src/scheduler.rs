//! Virtual-time scheduler.
//!
//! Executes [`EngineAction`]s against a virtual clock measured from zero, so
//! tests can step through a run millisecond by millisecond without sleeping.
//! Timers fire in deadline order; timers armed while firing are picked up in
//! the same [`SimScheduler::advance`] call if they fall inside the window.
//!
//! With [`SimScheduler::with_stale_delivery`], cancelled timers are not
//! removed but still delivered at their deadline, modelling a driver that
//! loses the race between cancellation and expiry.

use std::time::Duration;

use authsim_core::{
    EngineAction, SimulationCommand, SimulationEngine, SimulationSnapshot, StepCatalog,
    TimerTicket,
};

/// One completed step, as observed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advancement {
    /// Virtual time of the advancement.
    pub at: Duration,
    /// Index of the step that completed.
    pub completed_index: usize,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    ticket: TimerTicket,
    deadline: Duration,
    cancelled: bool,
}

/// Engine plus virtual clock.
#[derive(Debug, Clone)]
pub struct SimScheduler {
    engine: SimulationEngine,
    now: Duration,
    timers: Vec<ArmedTimer>,
    deliver_stale: bool,
    stale_deliveries: usize,
    advancements: Vec<Advancement>,
}

impl SimScheduler {
    /// Scheduler over an Idle engine at virtual time zero.
    pub fn new(catalog: StepCatalog) -> Self {
        Self {
            engine: SimulationEngine::new(catalog),
            now: Duration::ZERO,
            timers: Vec::new(),
            deliver_stale: false,
            stale_deliveries: 0,
            advancements: Vec::new(),
        }
    }

    /// Keep delivering cancelled timers at their deadlines.
    #[must_use]
    pub fn with_stale_delivery(mut self) -> Self {
        self.deliver_stale = true;
        self
    }

    /// The engine under test.
    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Snapshot of the engine.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.engine.snapshot()
    }

    /// Virtual time since construction.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Every advancement so far, in order.
    pub fn advancements(&self) -> &[Advancement] {
        &self.advancements
    }

    /// Number of cancelled timers delivered to the engine.
    pub fn stale_deliveries(&self) -> usize {
        self.stale_deliveries
    }

    /// Number of live (not cancelled) timers.
    pub fn live_timers(&self) -> usize {
        self.timers.iter().filter(|timer| !timer.cancelled).count()
    }

    /// Deadline of the live timer, if one is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().filter(|timer| !timer.cancelled).map(|timer| timer.deadline).min()
    }

    /// Issue a command at the current virtual time.
    pub fn apply(&mut self, command: SimulationCommand) {
        let actions = match command {
            SimulationCommand::Start => self.engine.start(),
            SimulationCommand::Pause => self.engine.pause(),
            SimulationCommand::Reset => self.engine.reset(),
        };
        self.execute(actions);
    }

    /// Move the clock forward, firing every timer due in the window.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now + by;

        while let Some(position) = self.next_due(target) {
            let timer = self.timers.remove(position);
            self.now = timer.deadline;

            if timer.cancelled {
                self.stale_deliveries += 1;
            }

            let before = self.engine.current_index();
            let actions = self.engine.on_timer(timer.ticket);
            if self.engine.current_index() != before {
                self.advancements.push(Advancement { at: self.now, completed_index: before });
            }
            self.execute(actions);
        }

        self.now = target;
    }

    /// Advance until no live timer remains. Returns the virtual time spent.
    pub fn run_to_completion(&mut self) -> Duration {
        let started = self.now;
        while let Some(deadline) = self.next_deadline() {
            self.advance(deadline.saturating_sub(self.now));
        }
        self.now - started
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= target)
            .min_by_key(|(_, timer)| (timer.deadline, timer.ticket))
            .map(|(position, _)| position)
    }

    fn execute(&mut self, actions: Vec<EngineAction>) {
        for action in actions {
            match action {
                EngineAction::ScheduleAdvance { ticket, delay } => {
                    self.timers.push(ArmedTimer {
                        ticket,
                        deadline: self.now + delay,
                        cancelled: false,
                    });
                },
                EngineAction::CancelAdvance { ticket } => {
                    if self.deliver_stale {
                        for timer in self.timers.iter_mut().filter(|timer| timer.ticket == ticket) {
                            timer.cancelled = true;
                        }
                    } else {
                        self.timers.retain(|timer| timer.ticket != ticket);
                    }
                },
            }
        }
    }
}
