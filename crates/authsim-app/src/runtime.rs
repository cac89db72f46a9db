//! Generic orchestration loop.
//!
//! The [`Runtime`] owns a [`SimulationEngine`] and a [`Driver`]. It waits on
//! whichever comes first, driver input or the armed advancement timer, feeds
//! the result to the engine as an [`EngineEvent`], executes the returned
//! [`EngineAction`]s, and renders the new snapshot.
//!
//! Advancements are strictly sequential: the next timer is only armed from
//! the actions of the advancement before it, and at most one timer is armed
//! at any time.

use std::time::Duration;

use authsim_core::{EngineAction, EngineEvent, SimulationEngine, StepCatalog, TimerTicket};

use crate::{Driver, DriverEvent, RuntimeConfig, ScheduledAdvance};

/// What woke the loop.
enum Wake {
    Driver(DriverEvent),
    Timer(TimerTicket),
}

/// Simulation runtime, generic over the presentation driver.
pub struct Runtime<D: Driver> {
    driver: D,
    engine: SimulationEngine,
    config: RuntimeConfig,
    timer: Option<ScheduledAdvance>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime with an Idle engine over `catalog`.
    pub fn new(driver: D, catalog: StepCatalog, config: RuntimeConfig) -> Self {
        Self { driver, engine: SimulationEngine::new(catalog), config, timer: None }
    }

    /// The engine being driven.
    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The armed advancement timer, if any.
    pub fn scheduled(&self) -> Option<&ScheduledAdvance> {
        self.timer.as_ref()
    }

    /// Run until the driver reports [`DriverEvent::Quit`].
    ///
    /// Calls [`Driver::stop`] on exit, including on error. Running again
    /// after an exit mid-run re-arms the current step with its full wait.
    ///
    /// # Errors
    ///
    /// Returns the first driver error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        tracing::info!(
            steps = self.engine.catalog().len(),
            speed = self.config.speed,
            "simulation runtime started"
        );

        self.rearm_pending();
        let result = self.run_loop().await;
        self.timer = None;
        self.driver.stop();

        tracing::info!(index = self.engine.current_index(), "simulation runtime stopped");
        result
    }

    async fn run_loop(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.engine.snapshot())?;

        loop {
            let wake = tokio::select! {
                biased;
                event = self.driver.poll_event() => Wake::Driver(event?),
                ticket = ScheduledAdvance::next(&mut self.timer) => Wake::Timer(ticket),
            };

            let event = match wake {
                Wake::Driver(DriverEvent::Quit) => return Ok(()),
                Wake::Driver(DriverEvent::Redraw) => {
                    self.driver.render(&self.engine.snapshot())?;
                    continue;
                },
                Wake::Driver(DriverEvent::Command(command)) => {
                    tracing::debug!(?command, "command received");
                    EngineEvent::Command(command)
                },
                Wake::Timer(ticket) => {
                    self.timer = None;
                    EngineEvent::TimerFired(ticket)
                },
            };

            let actions = self.engine.handle(event);
            self.execute(actions);
            self.driver.render(&self.engine.snapshot())?;
        }
    }

    /// Arm the timer for an advancement the engine still holds but the
    /// runtime dropped on its last exit.
    fn rearm_pending(&mut self) {
        let Some(ticket) = self.engine.pending_timer() else {
            return;
        };
        if self.timer.as_ref().is_some_and(|timer| timer.ticket() == ticket) {
            return;
        }

        let nominal = self
            .engine
            .catalog()
            .at(self.engine.current_index())
            .map_or(Duration::ZERO, |step| step.nominal_duration);
        tracing::debug!(ticket = ticket.get(), "re-arming pending advancement");
        self.timer = Some(ScheduledAdvance::arm(ticket, self.config.scaled(nominal)));
    }

    /// Execute engine actions against the tokio timer.
    fn execute(&mut self, actions: Vec<EngineAction>) {
        for action in actions {
            match action {
                EngineAction::ScheduleAdvance { ticket, delay } => {
                    let wait = self.config.scaled(delay);
                    tracing::trace!(ticket = ticket.get(), ?wait, "advancement scheduled");
                    self.timer = Some(ScheduledAdvance::arm(ticket, wait));
                },
                EngineAction::CancelAdvance { ticket } => {
                    if self.timer.as_ref().is_some_and(|timer| timer.ticket() == ticket) {
                        tracing::trace!(ticket = ticket.get(), "advancement cancelled");
                        self.timer = None;
                    }
                },
            }
        }
    }
}
