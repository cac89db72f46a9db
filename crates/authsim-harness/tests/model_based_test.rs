//! Property tests against a reference model.
//!
//! Random command and wait sequences run on both the reference model and the
//! real engine (on the virtual-time scheduler); observable state must agree
//! after every operation.
//!
//! # Architecture
//!
//! ```text
//! random catalog + Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!   ModelSimulation   SimScheduler     Compare
//!     (reference)    (real engine)     Results
//! ```

use std::time::Duration;

use authsim_core::{SimulationCommand, StepCatalog, StepStatus};
use authsim_harness::{
    ModelSimulation, Operation, SimScheduler, check_invariants, operations_from_bytes,
    random_catalog,
};
use proptest::prelude::*;

fn apply(sim: &mut SimScheduler, op: Operation) {
    match op {
        Operation::Start => sim.apply(SimulationCommand::Start),
        Operation::Pause => sim.apply(SimulationCommand::Pause),
        Operation::Reset => sim.apply(SimulationCommand::Reset),
        Operation::AdvanceTime { millis } => sim.advance(Duration::from_millis(u64::from(millis))),
    }
}

fn compare_with_model(catalog: StepCatalog, ops: &[Operation]) -> Result<(), TestCaseError> {
    let mut model = ModelSimulation::new(&catalog);
    let mut real = SimScheduler::new(catalog);

    for (i, op) in ops.iter().enumerate() {
        model.apply(*op);
        apply(&mut real, *op);

        let snapshot = real.snapshot();
        let statuses: Vec<StepStatus> = snapshot.steps.iter().map(|s| s.status).collect();

        prop_assert_eq!(
            snapshot.current_index, model.current_index(),
            "index diverged at operation {}: {:?}", i, op
        );
        prop_assert_eq!(
            snapshot.is_running, model.is_running(),
            "running flag diverged at operation {}: {:?}", i, op
        );
        prop_assert_eq!(
            statuses, model.statuses(),
            "statuses diverged at operation {}: {:?}", i, op
        );
    }
    Ok(())
}

/// Strategy for generating operations.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        // Weight towards letting time pass so runs actually progress
        3 => Just(Operation::Start),
        1 => Just(Operation::Pause),
        1 => Just(Operation::Reset),
        5 => (0..800u16).prop_map(|millis| Operation::AdvanceTime { millis }),
    ]
}

proptest! {
    /// Observable state matches between model and real engine after every
    /// operation.
    #[test]
    fn prop_model_matches_real(
        seed in any::<u64>(),
        len in 1..8usize,
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        compare_with_model(random_catalog(seed, len).unwrap(), &ops)?;
    }

    /// Same comparison, with operations decoded from unstructured bytes
    /// through their `Arbitrary` impl.
    #[test]
    fn prop_model_matches_real_from_bytes(
        seed in any::<u64>(),
        len in 1..8usize,
        data in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        let ops = operations_from_bytes(&data);
        prop_assert!(data.is_empty() || !ops.is_empty());
        compare_with_model(random_catalog(seed, len).unwrap(), &ops)?;
    }

    /// Structural invariants hold after any operation sequence, even when
    /// cancelled timers are still delivered.
    #[test]
    fn prop_invariants_hold_with_stale_timers(
        seed in any::<u64>(),
        len in 1..8usize,
        ops in prop::collection::vec(operation_strategy(), 0..80)
    ) {
        let mut sim = SimScheduler::new(random_catalog(seed, len).unwrap()).with_stale_delivery();

        for op in ops {
            apply(&mut sim, op);
            if let Err(violation) = check_invariants(&sim.snapshot()) {
                prop_assert!(false, "after {:?}: {}", op, violation);
            }
            prop_assert!(sim.live_timers() <= 1, "more than one live advancement timer");
        }
    }

    /// Any catalog played without interruption finishes with every step
    /// completed, exactly once, after the sum of the durations.
    #[test]
    fn prop_uninterrupted_run_completes(seed in any::<u64>(), len in 1..12usize) {
        let catalog = random_catalog(seed, len).unwrap();
        let total = catalog.total_duration();
        let mut sim = SimScheduler::new(catalog);

        sim.apply(SimulationCommand::Start);
        let elapsed = sim.run_to_completion();
        let snapshot = sim.snapshot();

        prop_assert_eq!(elapsed, total);
        prop_assert_eq!(snapshot.current_index, len);
        prop_assert!(!snapshot.is_running);
        prop_assert_eq!(snapshot.progress_percent, 100.0);
        prop_assert!(snapshot.steps.iter().all(|s| s.status == StepStatus::Completed));

        let completed: Vec<usize> = sim.advancements().iter().map(|a| a.completed_index).collect();
        prop_assert_eq!(completed, (0..len).collect::<Vec<_>>());
    }

    /// Pause then Start never skips or repeats a step.
    #[test]
    fn prop_pause_resume_keeps_active_step(
        seed in any::<u64>(),
        len in 1..8usize,
        before_pause in 0..2000u16
    ) {
        let mut sim = SimScheduler::new(random_catalog(seed, len).unwrap());
        sim.apply(SimulationCommand::Start);
        sim.advance(Duration::from_millis(u64::from(before_pause)));
        prop_assume!(sim.engine().is_running());

        let active = sim.snapshot().active_step().map(|s| s.definition.id);
        sim.apply(SimulationCommand::Pause);
        sim.apply(SimulationCommand::Start);

        prop_assert_eq!(sim.snapshot().active_step().map(|s| s.definition.id), active);
        prop_assert_eq!(sim.live_timers(), 1);
    }

    /// Start twice in a row schedules a single advancement.
    #[test]
    fn prop_double_start_schedules_once(seed in any::<u64>(), len in 1..8usize) {
        let catalog = random_catalog(seed, len).unwrap();
        let first = catalog.at(0).map(|s| s.nominal_duration).unwrap_or_default();
        let mut sim = SimScheduler::new(catalog);

        sim.apply(SimulationCommand::Start);
        sim.apply(SimulationCommand::Start);
        prop_assert_eq!(sim.live_timers(), 1);

        sim.advance(first);
        prop_assert_eq!(sim.advancements().len(), 1);
    }
}
