//! Full-screen terminal driver.
//!
//! Keys are read from crossterm's async [`EventStream`], which is cancel-safe:
//! the runtime may drop a pending [`Driver::poll_event`] future whenever the
//! advancement timer fires first without losing input.

use authsim_app::{Driver, DriverEvent};
use authsim_core::{SimulationCommand, SimulationSnapshot};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use thiserror::Error;

use crate::{commands, ui};

/// Terminal I/O failure.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Reading input or drawing failed.
    #[error("terminal I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Driver rendering the dashboard with ratatui.
pub struct TerminalDriver {
    terminal: DefaultTerminal,
    events: EventStream,
    running: bool,
    autostart: bool,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    ///
    /// The terminal is restored by [`Driver::stop`], and by ratatui's panic
    /// hook if the process panics first.
    pub fn new() -> Result<Self, TerminalError> {
        Ok(Self {
            terminal: ratatui::try_init()?,
            events: EventStream::new(),
            running: false,
            autostart: false,
        })
    }

    /// Start playing as soon as the runtime asks for input.
    pub fn with_autostart(mut self) -> Self {
        self.autostart = true;
        self
    }

    fn translate_key(&self, key: KeyEvent) -> Option<DriverEvent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Esc => Some(DriverEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(DriverEvent::Quit)
            },
            KeyCode::Enter => commands::key_command(' ')?.to_event(self.running),
            KeyCode::Char(c) => commands::key_command(c)?.to_event(self.running),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<DriverEvent, TerminalError> {
        if std::mem::take(&mut self.autostart) {
            return Ok(DriverEvent::Command(SimulationCommand::Start));
        }

        loop {
            let Some(event) = self.events.next().await else {
                return Ok(DriverEvent::Quit);
            };

            match event? {
                Event::Key(key) => {
                    if let Some(event) = self.translate_key(key) {
                        return Ok(event);
                    }
                },
                Event::Resize(..) => return Ok(DriverEvent::Redraw),
                _ => {},
            }
        }
    }

    fn render(&mut self, snapshot: &SimulationSnapshot) -> Result<(), TerminalError> {
        self.running = snapshot.is_running;
        self.terminal.draw(|frame| ui::draw(frame, snapshot))?;
        Ok(())
    }

    fn stop(&mut self) {
        ratatui::restore();
    }
}
