//! Invariant oracles over snapshots.

use authsim_core::{SimulationPhase, SimulationSnapshot, StepStatus, progress_percent};

/// Check every structural invariant of a snapshot.
///
/// - `current_index` is within `[0, N]`
/// - progress equals `100 * current_index / N` exactly
/// - steps before the current index are Completed, steps after it Pending
/// - the current step is Active while running, Active or Pending otherwise
/// - no step is in Error
/// - the phase agrees with the index and the running flag
pub fn check_invariants(snapshot: &SimulationSnapshot) -> Result<(), String> {
    let total = snapshot.total_steps();
    let current = snapshot.current_index;

    if current > total {
        return Err(format!("current_index {current} exceeds step count {total}"));
    }

    let expected = progress_percent(current, total);
    if snapshot.progress_percent.to_bits() != expected.to_bits() {
        return Err(format!("progress {} does not match {expected}", snapshot.progress_percent));
    }

    for (index, step) in snapshot.steps.iter().enumerate() {
        let ok = match index.cmp(&current) {
            std::cmp::Ordering::Less => step.status == StepStatus::Completed,
            std::cmp::Ordering::Greater => step.status == StepStatus::Pending,
            std::cmp::Ordering::Equal if snapshot.is_running => step.status == StepStatus::Active,
            std::cmp::Ordering::Equal => {
                matches!(step.status, StepStatus::Active | StepStatus::Pending)
            },
        };
        if !ok {
            return Err(format!(
                "step {index} is {:?} with current_index {current} (running: {})",
                step.status, snapshot.is_running
            ));
        }
    }

    let phase_ok = match snapshot.phase {
        SimulationPhase::Finished => current == total && !snapshot.is_running,
        SimulationPhase::Running => current < total && snapshot.is_running,
        SimulationPhase::Idle => {
            current == 0
                && !snapshot.is_running
                && snapshot.steps.iter().all(|s| s.status == StepStatus::Pending)
        },
        SimulationPhase::Paused => current < total && !snapshot.is_running,
    };
    if !phase_ok {
        return Err(format!(
            "phase {:?} inconsistent with current_index {current} (running: {})",
            snapshot.phase, snapshot.is_running
        ));
    }

    Ok(())
}
