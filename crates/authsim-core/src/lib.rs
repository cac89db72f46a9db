//! Authentication-flow simulation core
//!
//! Pure state machine logic for stepping through the IoMT mutual
//! authentication protocol, completely decoupled from I/O and timers. The
//! engine never sleeps and never reads a clock; it only says when it wants to
//! be woken up again.
//!
//! # Architecture
//!
//! The [`engine::SimulationEngine`] owns the run state of one simulation:
//! which step is current, whether the run is playing, and the live status of
//! every step. Commands and timer firings go in as [`engine::EngineEvent`]s,
//! and declarative [`engine::EngineAction`]s come out. A runtime or test
//! harness is responsible for arming and disarming the timers those actions
//! describe.
//!
//! Readers never touch engine internals. They take a
//! [`snapshot::SimulationSnapshot`], an owned copy of the state, and render
//! from that.
//!
//! Nothing here performs real cryptography. Operation labels in the catalog
//! are display text.
//!
//! # Components
//!
//! - [`catalog`]: Ordered, validated step definitions
//! - [`engine`]: Simulation state machine (start, pause, reset, advancement)
//! - [`snapshot`]: Immutable views handed to the presentation layer
//! - [`error`]: Catalog and codec error types

pub mod catalog;
pub mod engine;
pub mod error;
pub mod snapshot;

pub use catalog::{Participant, StepCatalog, StepDefinition};
pub use engine::{
    EngineAction, EngineEvent, SimulationCommand, SimulationEngine, SimulationPhase, StepStatus,
    TimerTicket, progress_percent,
};
pub use error::{CatalogError, CodecError};
pub use snapshot::{SimulationSnapshot, StepView};
