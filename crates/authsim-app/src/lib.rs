//! Application layer for the authentication-flow simulator
//!
//! Generic async runtime that drives a [`authsim_core::SimulationEngine`]
//! against real (or paused) tokio time, so the same orchestration code runs
//! behind the terminal UI, the headless CLI and the tests.
//!
//! # Components
//!
//! - [`Driver`]: Trait for presentation-specific I/O
//! - [`Runtime`]: Orchestration loop executing engine actions
//! - [`ScheduledAdvance`]: Cancellable handle for the one pending advancement
//! - [`SimulationHandle`]: Channel-backed command sender and snapshot
//!   subscription
//! - [`RuntimeConfig`]: Playback configuration

mod config;
mod driver;
mod error;
mod handle;
mod runtime;
mod timer;

pub use config::RuntimeConfig;
pub use driver::{Driver, DriverEvent};
pub use error::{ConfigError, HandleError};
pub use handle::{ChannelDriver, SimulationHandle, channel, spawn_simulation};
pub use runtime::Runtime;
pub use timer::ScheduledAdvance;
