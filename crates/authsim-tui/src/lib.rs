//! Terminal dashboard for the authentication-flow simulator
//!
//! A thin shell over [`authsim_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`authsim_app::Runtime`].
//!
//! Two frontends are provided: a full-screen [`TerminalDriver`] and a
//! line-oriented [`LineDriver`] for headless use, which reads text commands
//! and reports progress through `tracing`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod line;
pub mod terminal;
pub mod ui;

pub use authsim_app::{Driver, DriverEvent, Runtime, RuntimeConfig};
pub use cli::{Args, CliError};
pub use commands::Command;
pub use line::LineDriver;
pub use terminal::{TerminalDriver, TerminalError};
