//! Headless runs fed through an in-memory pipe.
//!
//! Commands are written while the runtime is playing, on a paused clock, to
//! check that typed input interleaves with timer-driven advancement.

use std::time::Duration;

use authsim_core::{Participant, SimulationPhase, SimulationSnapshot, StepCatalog, StepDefinition};
use authsim_tui::{LineDriver, Runtime, RuntimeConfig};
use tokio::{
    io::{AsyncWriteExt, BufReader, DuplexStream},
    task::JoinHandle,
    time::sleep,
};

fn catalog() -> StepCatalog {
    let steps = (1..=4)
        .map(|id| {
            StepDefinition::new(
                id,
                format!("step {id}"),
                "headless step",
                Participant::Device,
                Participant::Collector,
                Duration::from_millis(100),
            )
        })
        .collect();
    StepCatalog::new(steps).unwrap()
}

fn spawn(
    driver: LineDriver<BufReader<DuplexStream>>,
) -> JoinHandle<std::io::Result<SimulationSnapshot>> {
    tokio::spawn(async move {
        let mut runtime = Runtime::new(driver, catalog(), RuntimeConfig::default());
        runtime.run().await?;
        Ok(runtime.engine().snapshot())
    })
}

#[tokio::test(start_paused = true)]
async fn pause_typed_mid_run() {
    let (mut input, output) = tokio::io::duplex(64);
    let task = spawn(LineDriver::new(BufReader::new(output)));

    input.write_all(b"start\n").await.unwrap();
    sleep(Duration::from_millis(150)).await;
    input.write_all(b"pause\n").await.unwrap();
    sleep(Duration::from_secs(5)).await;
    input.write_all(b"quit\n").await.unwrap();

    let snapshot = task.await.unwrap().unwrap();
    assert_eq!(snapshot.phase, SimulationPhase::Paused);
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.progress_label(), "Step 2 of 4 - 25% Complete");
}

#[tokio::test(start_paused = true)]
async fn closing_input_mid_run_plays_to_the_end() {
    let (mut input, output) = tokio::io::duplex(64);
    let task = spawn(LineDriver::new(BufReader::new(output)).with_quit_when_finished());

    input.write_all(b"start\n").await.unwrap();
    sleep(Duration::from_millis(50)).await;
    drop(input);

    let snapshot = task.await.unwrap().unwrap();
    assert_eq!(snapshot.phase, SimulationPhase::Finished);
    assert_eq!(snapshot.progress_percent, 100.0);
}

#[tokio::test(start_paused = true)]
async fn toggle_resumes_where_it_paused() {
    let (mut input, output) = tokio::io::duplex(64);
    let task = spawn(LineDriver::new(BufReader::new(output)));

    input.write_all(b"toggle\n").await.unwrap();
    sleep(Duration::from_millis(250)).await;
    input.write_all(b"toggle\n").await.unwrap();
    sleep(Duration::from_millis(10)).await;
    input.write_all(b"toggle\n").await.unwrap();
    sleep(Duration::from_millis(50)).await;
    input.write_all(b"q\n").await.unwrap();

    // Paused at 250ms on step 3, resumed at 260ms: its full 100ms wait has
    // not elapsed at 310ms.
    let snapshot = task.await.unwrap().unwrap();
    assert!(snapshot.is_running);
    assert_eq!(snapshot.current_index, 2);
}
