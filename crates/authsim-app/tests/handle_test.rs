//! Runtime tests through the channel handle.
//!
//! Every test runs on a paused tokio clock. Time only moves when all tasks
//! are idle, so each `sleep` in a test lands deterministically between the
//! runtime's own timer deadlines.

use std::time::Duration;

use authsim_app::{HandleError, RuntimeConfig, SimulationHandle, spawn_simulation};
use authsim_core::{
    Participant, SimulationPhase, SimulationSnapshot, StepCatalog, StepDefinition, StepStatus,
};
use authsim_harness::check_invariants;
use tokio::time::sleep;

fn three_steps() -> StepCatalog {
    let steps = [100, 50, 200]
        .into_iter()
        .zip(1..)
        .map(|(millis, id)| {
            StepDefinition::new(
                id,
                format!("step {id}"),
                "runtime step",
                Participant::Collector,
                Participant::Device,
                Duration::from_millis(millis),
            )
        })
        .collect();
    StepCatalog::new(steps).unwrap()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn statuses(snapshot: &SimulationSnapshot) -> Vec<StepStatus> {
    snapshot.steps.iter().map(|s| s.status).collect()
}

fn checked(handle: &SimulationHandle) -> SimulationSnapshot {
    let snapshot = handle.snapshot();
    check_invariants(&snapshot).unwrap();
    snapshot
}

#[tokio::test(start_paused = true)]
async fn initial_snapshot_is_idle() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());

    let snapshot = checked(&handle);
    assert_eq!(snapshot.phase, SimulationPhase::Idle);
    assert_eq!(snapshot.progress_percent, 0.0);
    assert_eq!(snapshot.total_steps(), 3);
}

#[tokio::test(start_paused = true)]
async fn full_run_on_virtual_clock() {
    use StepStatus::{Active, Completed, Pending};

    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    handle.start().unwrap();

    sleep(ms(101)).await;
    let snapshot = checked(&handle);
    assert_eq!(statuses(&snapshot), vec![Completed, Active, Pending]);
    assert_eq!(snapshot.current_index, 1);
    assert!((snapshot.progress_percent - 33.33).abs() < 0.01);

    sleep(ms(50)).await;
    let snapshot = checked(&handle);
    assert_eq!(statuses(&snapshot), vec![Completed, Completed, Active]);
    assert_eq!(snapshot.current_index, 2);
    assert!((snapshot.progress_percent - 66.67).abs() < 0.01);

    sleep(ms(200)).await;
    let snapshot = checked(&handle);
    assert_eq!(statuses(&snapshot), vec![Completed, Completed, Completed]);
    assert_eq!(snapshot.current_index, 3);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.progress_percent, 100.0);
}

#[tokio::test(start_paused = true)]
async fn pause_then_start_waits_full_duration() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    handle.start().unwrap();

    sleep(ms(60)).await;
    assert_eq!(checked(&handle).steps[0].status, StepStatus::Active);

    handle.pause().unwrap();
    sleep(ms(10)).await;
    let snapshot = checked(&handle);
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.steps[0].status, StepStatus::Active);
    assert!(!snapshot.is_running);

    // Resumed at 70ms; the fresh 100ms wait ends at 170ms.
    handle.start().unwrap();
    sleep(ms(99)).await;
    assert_eq!(checked(&handle).current_index, 0);

    sleep(ms(2)).await;
    let snapshot = checked(&handle);
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.steps[0].status, StepStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn paused_run_stays_frozen() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    handle.start().unwrap();
    sleep(ms(30)).await;
    handle.pause().unwrap();

    sleep(ms(10_000)).await;
    let snapshot = checked(&handle);
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.phase, SimulationPhase::Paused);
}

#[tokio::test(start_paused = true)]
async fn double_start_advances_once() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    handle.start().unwrap();
    handle.start().unwrap();

    sleep(ms(101)).await;
    assert_eq!(checked(&handle).current_index, 1);
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_advancement() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    handle.start().unwrap();
    sleep(ms(120)).await;

    handle.reset().unwrap();
    sleep(ms(1000)).await;

    let snapshot = checked(&handle);
    assert_eq!(snapshot.phase, SimulationPhase::Idle);
    assert_eq!(snapshot.current_index, 0);
    assert!(snapshot.steps.iter().all(|s| s.status == StepStatus::Pending));
}

#[tokio::test(start_paused = true)]
async fn start_after_finish_resets_without_running() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    handle.start().unwrap();
    handle.wait_for(SimulationSnapshot::is_finished).await.unwrap();

    handle.start().unwrap();
    sleep(ms(500)).await;

    let snapshot = checked(&handle);
    assert_eq!(snapshot.phase, SimulationPhase::Idle);
    assert!(!snapshot.is_running);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_every_advancement() {
    let (handle, _task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    let mut updates = handle.subscribe();
    handle.start().unwrap();

    let mut seen = Vec::new();
    while !updates.borrow_and_update().is_finished() {
        updates.changed().await.unwrap();
        let snapshot = updates.borrow().clone();
        check_invariants(&snapshot).unwrap();
        seen.push(snapshot.current_index);
    }

    // Start, then one publish per advancement.
    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn dropping_handles_stops_runtime() {
    let (handle, task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    let observer = handle.subscribe();
    drop(handle);

    task.await.unwrap();
    assert!(observer.has_changed().is_err());
}

#[tokio::test(start_paused = true)]
async fn commands_after_stop_fail() {
    let (handle, task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    task.abort();
    let _ = task.await;

    assert_eq!(handle.start(), Err(HandleError::Closed));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_runtime_with_clones_alive() {
    let (handle, task) = spawn_simulation(three_steps(), RuntimeConfig::default());
    let other = handle.clone();
    handle.start().unwrap();
    sleep(ms(120)).await;

    other.shutdown().unwrap();
    task.await.unwrap();

    assert_eq!(handle.snapshot().current_index, 1);
    assert_eq!(handle.pause(), Err(HandleError::Closed));
}
