//! Channel-backed driver and handle.
//!
//! [`channel`] splits a simulation into a [`SimulationHandle`] for the
//! presentation side and a [`ChannelDriver`] for the runtime side. Commands
//! flow one way over an unbounded mpsc channel; snapshots flow the other way
//! over a `watch` channel, so subscribers always see the latest state and
//! never a mutable reference to it.

use std::convert::Infallible;

use authsim_core::{SimulationCommand, SimulationEngine, SimulationSnapshot, StepCatalog};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{Driver, DriverEvent, HandleError, Runtime, RuntimeConfig};

/// Presentation-side handle to a running simulation.
///
/// Cheap to clone. The runtime stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    commands: mpsc::UnboundedSender<DriverEvent>,
    snapshots: watch::Receiver<SimulationSnapshot>,
}

impl SimulationHandle {
    /// Send a command. Does not wait for it to be applied.
    pub fn send(&self, command: SimulationCommand) -> Result<(), HandleError> {
        self.commands.send(DriverEvent::Command(command)).map_err(|_| HandleError::Closed)
    }

    /// Play, or restart a finished run.
    pub fn start(&self) -> Result<(), HandleError> {
        self.send(SimulationCommand::Start)
    }

    /// Freeze on the current step.
    pub fn pause(&self) -> Result<(), HandleError> {
        self.send(SimulationCommand::Pause)
    }

    /// Return to Idle.
    pub fn reset(&self) -> Result<(), HandleError> {
        self.send(SimulationCommand::Reset)
    }

    /// Stop the runtime, even while other handle clones are alive.
    pub fn shutdown(&self) -> Result<(), HandleError> {
        self.commands.send(DriverEvent::Quit).map_err(|_| HandleError::Closed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SimulationSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the first snapshot matching `predicate`, including the
    /// current one.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::Closed`] if the runtime stops first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SimulationSnapshot) -> bool,
    ) -> Result<SimulationSnapshot, HandleError> {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| HandleError::Closed)?;
        Ok(snapshot.clone())
    }
}

/// Runtime-side driver fed by a [`SimulationHandle`].
#[derive(Debug)]
pub struct ChannelDriver {
    commands: mpsc::UnboundedReceiver<DriverEvent>,
    snapshots: watch::Sender<SimulationSnapshot>,
}

impl Driver for ChannelDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<DriverEvent, Infallible> {
        Ok(self.commands.recv().await.unwrap_or(DriverEvent::Quit))
    }

    fn render(&mut self, snapshot: &SimulationSnapshot) -> Result<(), Infallible> {
        self.snapshots.send_if_modified(|current| {
            if current == snapshot {
                return false;
            }
            *current = snapshot.clone();
            true
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.commands.close();
    }
}

/// Create a connected handle and driver for `catalog`.
///
/// The handle's snapshot starts at the Idle state of the catalog.
pub fn channel(catalog: &StepCatalog) -> (SimulationHandle, ChannelDriver) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) =
        watch::channel(SimulationEngine::new(catalog.clone()).snapshot());

    (
        SimulationHandle { commands: command_tx, snapshots: snapshot_rx },
        ChannelDriver { commands: command_rx, snapshots: snapshot_tx },
    )
}

/// Spawn a runtime for `catalog` on the current tokio runtime.
///
/// The task ends on [`SimulationHandle::shutdown`] or once every handle clone
/// has been dropped.
pub fn spawn_simulation(
    catalog: StepCatalog,
    config: RuntimeConfig,
) -> (SimulationHandle, JoinHandle<()>) {
    let (handle, driver) = channel(&catalog);
    let mut runtime = Runtime::new(driver, catalog, config);

    let task = tokio::spawn(async move {
        match runtime.run().await {
            Ok(()) => {},
            Err(never) => match never {},
        }
    });

    (handle, task)
}
