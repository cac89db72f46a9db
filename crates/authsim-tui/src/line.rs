//! Line-oriented driver for headless runs.
//!
//! Reads one command per line and reports progress through `tracing`
//! instead of drawing. Useful over pipes and in scripts:
//!
//! ```text
//! $ printf 'start\n' | authsim-tui --headless --speed 10
//! ```

use std::future;

use authsim_app::{Driver, DriverEvent};
use authsim_core::{SimulationCommand, SimulationSnapshot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    commands::{self, Command},
    ui,
};

/// Driver reading text commands from an async reader.
pub struct LineDriver<R> {
    lines: Lines<R>,
    input_open: bool,
    autostart: bool,
    quit_when_finished: bool,
    running: bool,
    finished: bool,
    last_label: Option<String>,
}

impl LineDriver<BufReader<Stdin>> {
    /// Driver over the process's standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineDriver<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Driver reading commands from `input`.
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            input_open: true,
            autostart: false,
            quit_when_finished: false,
            running: false,
            finished: false,
            last_label: None,
        }
    }

    /// Start playing before reading any input.
    pub fn with_autostart(mut self) -> Self {
        self.autostart = true;
        self
    }

    /// Keep playing when input ends mid-run and quit once the run finishes.
    pub fn with_quit_when_finished(mut self) -> Self {
        self.quit_when_finished = true;
        self
    }

    /// Progress label of the last rendered snapshot.
    pub fn last_label(&self) -> Option<&str> {
        self.last_label.as_deref()
    }
}

impl<R> Driver for LineDriver<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    type Error = std::io::Error;

    async fn poll_event(&mut self) -> Result<DriverEvent, std::io::Error> {
        if std::mem::take(&mut self.autostart) {
            return Ok(DriverEvent::Command(SimulationCommand::Start));
        }

        loop {
            if self.quit_when_finished && self.finished {
                return Ok(DriverEvent::Quit);
            }

            if !self.input_open {
                if self.quit_when_finished && self.running {
                    // Let the timer drive the run to the end.
                    return future::pending().await;
                }
                return Ok(DriverEvent::Quit);
            }

            let Some(line) = self.lines.next_line().await? else {
                tracing::debug!("input closed");
                self.input_open = false;
                continue;
            };

            let command = commands::parse(&line);
            if let Some(event) = command.to_event(self.running) {
                return Ok(event);
            }
            if let Command::Unknown { input } = command {
                tracing::warn!(%input, "unknown command");
            }
        }
    }

    fn render(&mut self, snapshot: &SimulationSnapshot) -> Result<(), std::io::Error> {
        self.running = snapshot.is_running;
        self.finished = snapshot.is_finished();

        let label = snapshot.progress_label();
        if self.last_label.as_deref() == Some(label.as_str()) {
            return Ok(());
        }

        match snapshot.active_step() {
            Some(step) => tracing::info!(
                progress = %label,
                step = %step.definition.title,
                status = step.status.label(),
                "step active"
            ),
            None => tracing::info!(progress = %label, phase = ?snapshot.phase, "simulation idle"),
        }
        tracing::debug!(timeline = %ui::timeline(snapshot), "steps");
        self.last_label = Some(label);
        Ok(())
    }

    fn stop(&mut self) {
        self.input_open = false;
    }
}
