//! Driver trait for abstracting presentation I/O.
//!
//! The [`Driver`] trait decouples the simulation runtime from specific
//! frontends. Each frontend implements the trait to provide its own input
//! and rendering, while the generic [`crate::Runtime`] handles timers and
//! engine orchestration.

use std::future::Future;

use authsim_core::{SimulationCommand, SimulationSnapshot};

/// Input reported by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    /// Forward a command to the engine.
    Command(SimulationCommand),
    /// Render again without touching the engine (e.g. terminal resize).
    Redraw,
    /// Stop the runtime.
    Quit,
}

/// Abstracts presentation I/O for the simulation runtime.
///
/// Implementations provide input and rendering while the generic
/// [`crate::Runtime`] handles orchestration logic. This ensures the same
/// orchestration code runs in the terminal UI, headless mode, and tests.
pub trait Driver: Send {
    /// Frontend-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input.
    ///
    /// The runtime races this future against the advancement timer and drops
    /// it when the timer wins, so implementations must be cancel-safe: no
    /// input may be lost when the future is dropped before completion.
    fn poll_event(&mut self) -> impl Future<Output = Result<DriverEvent, Self::Error>> + Send;

    /// Render a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, snapshot: &SimulationSnapshot) -> Result<(), Self::Error>;

    /// Release frontend resources. Called once when the runtime exits.
    fn stop(&mut self);
}
