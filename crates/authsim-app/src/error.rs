//! Application layer errors.

use thiserror::Error;

/// Invalid runtime configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Speed must be finite and greater than zero.
    #[error("invalid playback speed {speed}: must be finite and greater than zero")]
    InvalidSpeed {
        /// The rejected value.
        speed: f64,
    },
}

/// A [`crate::SimulationHandle`] operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    /// The runtime has stopped and no longer accepts commands.
    #[error("simulation runtime has stopped")]
    Closed,
}
