//! Deterministic simulation harness for the authentication-flow engine.
//!
//! Virtual-time execution of engine actions, a reference model of the
//! observable behaviour, invariant oracles, and seeded catalog generation
//! for reproducible property tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog_gen;
pub mod model;
pub mod oracle;
pub mod scenario;
pub mod scheduler;

pub use catalog_gen::random_catalog;
pub use model::{ModelSimulation, Operation, operations_from_bytes};
pub use oracle::check_invariants;
pub use scenario::{OracleFn, RunnableScenario, Scenario};
pub use scheduler::{Advancement, SimScheduler};
