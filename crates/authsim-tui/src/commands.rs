//! Command parsing for the TUI and the line-oriented frontend.
//!
//! This module turns key presses and text lines into structured [`Command`]
//! values, and commands into [`DriverEvent`]s for the runtime.

use authsim_app::DriverEvent;
use authsim_core::SimulationCommand;

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play, or restart a finished run.
    Start,

    /// Freeze on the current step.
    Pause,

    /// Start when stopped, pause when running.
    Toggle,

    /// Back to the first step.
    Reset,

    /// Quit the application.
    Quit,

    /// Blank input.
    Empty,

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },
}

impl Command {
    /// Event for the runtime, given whether the simulation is running.
    ///
    /// `Empty` and `Unknown` produce nothing.
    pub fn to_event(&self, running: bool) -> Option<DriverEvent> {
        let command = match self {
            Self::Start => SimulationCommand::Start,
            Self::Pause => SimulationCommand::Pause,
            Self::Toggle if running => SimulationCommand::Pause,
            Self::Toggle => SimulationCommand::Start,
            Self::Reset => SimulationCommand::Reset,
            Self::Quit => return Some(DriverEvent::Quit),
            Self::Empty | Self::Unknown { .. } => return None,
        };
        Some(DriverEvent::Command(command))
    }
}

/// Parse a line of text into a command.
///
/// A leading `/` is accepted and ignored, so `/start` and `start` are the
/// same command.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Empty;
    }

    let word = input.strip_prefix('/').unwrap_or(input);

    match word.to_ascii_lowercase().as_str() {
        "start" | "play" | "restart" => Command::Start,
        "pause" => Command::Pause,
        "toggle" => Command::Toggle,
        "reset" => Command::Reset,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown { input: input.to_string() },
    }
}

/// Command bound to a single key, if any.
pub fn key_command(key: char) -> Option<Command> {
    match key.to_ascii_lowercase() {
        's' => Some(Command::Start),
        'p' => Some(Command::Pause),
        ' ' => Some(Command::Toggle),
        'r' => Some(Command::Reset),
        'q' => Some(Command::Quit),
        _ => None,
    }
}
