//! Simulation engine state machine.
//!
//! # Architecture: Action-Based State Machine
//!
//! The engine follows the action pattern:
//! - Commands and timer firings come in as [`EngineEvent`]s
//! - Methods return `Vec<EngineAction>` describing timers to arm or disarm
//! - Driver code executes actions (sleep, cancel, render)
//!
//! The engine never reads a clock. It asks for a wake-up after a step's
//! nominal duration by handing out a [`TimerTicket`], and it only honours the
//! ticket it handed out last. A timer that fires after [`pause`] or
//! [`reset`] carries a ticket the engine no longer holds and is ignored, so a
//! driver that loses the race against a cancellation cannot corrupt state.
//!
//! [`pause`]: SimulationEngine::pause
//! [`reset`]: SimulationEngine::reset
//!
//! # State Machine
//!
//! ```text
//!            start                      last advancement
//! ┌──────┐ ────────> ┌─────────┐ ───────────────────────> ┌──────────┐
//! │ Idle │           │ Running │                          │ Finished │
//! └──────┘ <─┐       └─────────┘                          └──────────┘
//!     ^      │     pause │  ^ start                            │
//!     │      │           v  │                                 │ start / reset
//!     │      │       ┌────────┐                               │
//!     │      └───────│ Paused │                               │
//!     │      reset   └────────┘                               │
//!     └───────────────────────────────────────────────────────┘
//! ```
//!
//! `start` on a finished run resets it to Idle and does not begin playing; a
//! second `start` is needed. `pause` does not remember elapsed time: resuming
//! waits the current step's full nominal duration again.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::StepCatalog,
    snapshot::{SimulationSnapshot, StepView},
};

/// Display status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not reached yet.
    Pending,
    /// Current step, waiting for its advancement.
    Active,
    /// Advanced past.
    Completed,
    /// Reserved. The advancement algorithm never assigns it.
    Error,
}

impl StepStatus {
    /// Badge text shown next to a step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Processing",
            Self::Completed => "Completed",
            Self::Error => "Error",
        }
    }
}

/// Commands the presentation layer may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationCommand {
    /// Play from the current step, or restart a finished run.
    Start,
    /// Freeze on the current step.
    Pause,
    /// Back to Idle.
    Reset,
}

/// Coarse lifecycle state, derived from the engine's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationPhase {
    /// Never started, or just reset.
    Idle,
    /// Playing; an advancement is scheduled.
    Running,
    /// Stopped part-way through.
    Paused,
    /// Every step completed.
    Finished,
}

/// Identifies one scheduled advancement.
///
/// Tickets are never reused within an engine, so a stale ticket can never be
/// mistaken for the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerTicket(u64);

impl TimerTicket {
    /// Raw generation number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Inputs to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A presentation-layer command.
    Command(SimulationCommand),
    /// A timer armed by [`EngineAction::ScheduleAdvance`] expired.
    TimerFired(TimerTicket),
}

/// Actions returned by the engine.
///
/// The driver (test harness or async runtime) executes these actions:
/// - `ScheduleAdvance`: Arm a one-shot timer and report it back as
///   [`EngineEvent::TimerFired`] when it expires
/// - `CancelAdvance`: Disarm the timer with this ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    /// Wake the engine after `delay`.
    ScheduleAdvance {
        /// Ticket to hand back on expiry.
        ticket: TimerTicket,
        /// Nominal duration of the step that just became active.
        delay: Duration,
    },

    /// The timer with this ticket must not fire.
    CancelAdvance {
        /// Ticket of the disarmed timer.
        ticket: TimerTicket,
    },
}

/// Percentage of `total` steps covered by `current`.
///
/// An empty catalog counts as fully done.
pub fn progress_percent(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    current as f64 * 100.0 / total as f64
}

/// Simulation state machine.
///
/// Owns the run state of one simulation over a fixed catalog. This is a pure
/// state machine: no I/O, no clock, no timers of its own.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    /// Step script, immutable for the engine's lifetime
    catalog: StepCatalog,
    /// Live status per step, parallel to the catalog
    statuses: Vec<StepStatus>,
    /// Index of the current step, `catalog.len()` once finished
    current_index: usize,
    /// Whether the run is playing
    running: bool,
    /// The one outstanding advancement, if any
    pending: Option<TimerTicket>,
    /// Next ticket generation
    next_ticket: u64,
}

impl SimulationEngine {
    /// Create an engine in the Idle state.
    pub fn new(catalog: StepCatalog) -> Self {
        let statuses = vec![StepStatus::Pending; catalog.len()];
        Self { catalog, statuses, current_index: 0, running: false, pending: None, next_ticket: 0 }
    }

    /// The catalog this engine steps through.
    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    /// Index of the current step. Equals the catalog length once finished.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether the run is playing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Progress derived from the current index.
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_index, self.catalog.len())
    }

    /// Status of the step at `index`.
    pub fn status_at(&self, index: usize) -> Option<StepStatus> {
        self.statuses.get(index).copied()
    }

    /// Ticket of the outstanding advancement, if one is scheduled.
    pub fn pending_timer(&self) -> Option<TimerTicket> {
        self.pending
    }

    /// Whether every step has completed.
    pub fn is_finished(&self) -> bool {
        self.current_index >= self.catalog.len()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SimulationPhase {
        if self.is_finished() {
            SimulationPhase::Finished
        } else if self.running {
            SimulationPhase::Running
        } else if self.current_index == 0 && self.statuses.first() == Some(&StepStatus::Pending) {
            SimulationPhase::Idle
        } else {
            SimulationPhase::Paused
        }
    }

    /// Process an event and return the actions to execute.
    pub fn handle(&mut self, event: EngineEvent) -> Vec<EngineAction> {
        match event {
            EngineEvent::Command(SimulationCommand::Start) => self.start(),
            EngineEvent::Command(SimulationCommand::Pause) => self.pause(),
            EngineEvent::Command(SimulationCommand::Reset) => self.reset(),
            EngineEvent::TimerFired(ticket) => self.on_timer(ticket),
        }
    }

    /// Return to Idle: index 0, not running, every step Pending.
    ///
    /// Cancels the outstanding advancement, if any. Idempotent.
    pub fn reset(&mut self) -> Vec<EngineAction> {
        let actions = self.cancel_pending();

        self.current_index = 0;
        self.running = false;
        self.statuses.fill(StepStatus::Pending);

        tracing::debug!(steps = self.catalog.len(), "simulation reset");
        actions
    }

    /// Play from the current step.
    ///
    /// On a finished run this resets to Idle and returns without playing.
    /// While already running this is a no-op.
    pub fn start(&mut self) -> Vec<EngineAction> {
        if self.is_finished() {
            tracing::debug!("start on finished simulation, restarting from idle");
            return self.reset();
        }

        if self.running {
            return Vec::new();
        }

        self.running = true;
        tracing::debug!(index = self.current_index, "simulation started");

        self.statuses[self.current_index] = StepStatus::Active;
        vec![self.schedule_current()]
    }

    /// Stop playing, leaving the current step Active and frozen.
    ///
    /// Cancels the outstanding advancement. Elapsed time is not kept.
    pub fn pause(&mut self) -> Vec<EngineAction> {
        if self.running {
            tracing::debug!(index = self.current_index, "simulation paused");
        }
        self.running = false;
        self.cancel_pending()
    }

    /// Handle an expired advancement timer.
    ///
    /// Tickets other than the outstanding one, and any firing while paused,
    /// are stale and ignored.
    pub fn on_timer(&mut self, ticket: TimerTicket) -> Vec<EngineAction> {
        if self.pending != Some(ticket) || !self.running {
            tracing::trace!(ticket = ticket.get(), "ignoring stale advancement timer");
            return Vec::new();
        }
        self.pending = None;

        let total = self.catalog.len();
        let completed = self.current_index;

        self.statuses[completed] = StepStatus::Completed;
        if completed + 1 < total {
            self.statuses[completed + 1] = StepStatus::Active;
        }
        self.current_index = completed + 1;

        tracing::debug!(
            completed,
            index = self.current_index,
            progress = self.progress_percent(),
            "step completed"
        );

        if self.is_finished() {
            self.running = false;
            tracing::debug!(steps = total, "simulation finished");
            return Vec::new();
        }

        vec![self.schedule_current()]
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> SimulationSnapshot {
        let steps = self
            .statuses
            .iter()
            .enumerate()
            .filter_map(|(index, &status)| {
                self.catalog.shared(index).map(|definition| StepView { definition, status })
            })
            .collect();

        SimulationSnapshot {
            current_index: self.current_index,
            is_running: self.running,
            progress_percent: self.progress_percent(),
            phase: self.phase(),
            steps,
        }
    }

    /// Arm a timer for the current step's nominal duration.
    fn schedule_current(&mut self) -> EngineAction {
        let ticket = TimerTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);

        let delay = self
            .catalog
            .at(self.current_index)
            .map_or(Duration::ZERO, |step| step.nominal_duration);

        EngineAction::ScheduleAdvance { ticket, delay }
    }

    fn cancel_pending(&mut self) -> Vec<EngineAction> {
        self.pending
            .take()
            .map(|ticket| EngineAction::CancelAdvance { ticket })
            .into_iter()
            .collect()
    }
}
