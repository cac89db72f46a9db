//! Immutable state snapshots.
//!
//! A snapshot is an owned copy of the engine's state at one instant. The
//! presentation layer renders from snapshots only and can never reach back
//! into the engine through them. Step definitions are shared with the
//! catalog behind an [`Arc`], so taking a snapshot copies statuses, not text.

use std::{io, sync::Arc};

use serde::Serialize;

use crate::{
    catalog::StepDefinition,
    engine::{SimulationPhase, StepStatus},
    error::CodecError,
};

/// One step as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    /// Immutable definition from the catalog.
    #[serde(flatten)]
    pub definition: Arc<StepDefinition>,
    /// Live status at snapshot time.
    pub status: StepStatus,
}

/// Owned copy of the engine state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// Index of the current step; equals `steps.len()` once finished.
    pub current_index: usize,
    /// Whether the run was playing.
    pub is_running: bool,
    /// `100 * current_index / steps.len()`.
    pub progress_percent: f64,
    /// Lifecycle phase.
    pub phase: SimulationPhase,
    /// Every step in catalog order.
    pub steps: Vec<StepView>,
}

impl SimulationSnapshot {
    /// Number of steps in the run.
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Whether every step has completed.
    pub fn is_finished(&self) -> bool {
        self.phase == SimulationPhase::Finished
    }

    /// The step currently marked Active.
    pub fn active_step(&self) -> Option<&StepView> {
        self.steps.get(self.current_index).filter(|step| step.status == StepStatus::Active)
    }

    /// Number of Completed steps.
    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|step| step.status == StepStatus::Completed).count()
    }

    /// Progress line, e.g. `Step 3 of 7 - 29% Complete`.
    ///
    /// The percentage rounds half up, so 12.5% shows as 13%.
    pub fn progress_label(&self) -> String {
        let total = self.total_steps();
        let shown = (self.current_index + 1).min(total);
        let percent = (self.progress_percent + 0.5).floor();
        format!("Step {shown} of {total} - {percent:.0}% Complete")
    }

    /// Text for the play control in the current phase.
    pub fn control_label(&self) -> &'static str {
        match self.phase {
            SimulationPhase::Running => "Pause",
            SimulationPhase::Finished => "Restart",
            SimulationPhase::Idle | SimulationPhase::Paused => "Start",
        }
    }

    /// Encode the snapshot as CBOR.
    pub fn to_cbor<W: io::Write>(&self, writer: W) -> Result<(), CodecError> {
        ciborium::into_writer(self, writer).map_err(|e| CodecError::Encode(e.to_string()))
    }
}
