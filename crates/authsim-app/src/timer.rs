//! Cancellable advancement timer.

use std::{pin::Pin, time::Duration};

use authsim_core::TimerTicket;
use tokio::time::{Instant, Sleep};

/// The one outstanding advancement, armed on the tokio timer.
///
/// Dropping the value cancels the timer. The runtime holds at most one.
#[derive(Debug)]
pub struct ScheduledAdvance {
    ticket: TimerTicket,
    sleep: Pin<Box<Sleep>>,
}

impl ScheduledAdvance {
    /// Arm a timer that expires after `delay`.
    pub fn arm(ticket: TimerTicket, delay: Duration) -> Self {
        Self { ticket, sleep: Box::pin(tokio::time::sleep(delay)) }
    }

    /// Ticket to report to the engine on expiry.
    pub fn ticket(&self) -> TimerTicket {
        self.ticket
    }

    /// When the timer expires.
    pub fn deadline(&self) -> Instant {
        self.sleep.deadline()
    }

    /// Wait for expiry and return the ticket.
    ///
    /// Cancel-safe: dropping the future leaves the timer armed.
    pub async fn expired(&mut self) -> TimerTicket {
        self.sleep.as_mut().await;
        self.ticket
    }

    /// Wait on an optional timer; pends forever when nothing is armed.
    pub(crate) async fn next(timer: &mut Option<Self>) -> TimerTicket {
        match timer {
            Some(timer) => timer.expired().await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use authsim_core::{SimulationEngine, StepCatalog};

    use super::*;

    fn live_ticket() -> TimerTicket {
        let mut engine = SimulationEngine::new(StepCatalog::iomt_authentication());
        engine.start();
        engine.pending_timer().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn expires_at_deadline() {
        let ticket = live_ticket();
        let armed_at = Instant::now();
        let mut timer = ScheduledAdvance::arm(ticket, Duration::from_millis(100));

        assert_eq!(timer.deadline(), armed_at + Duration::from_millis(100));
        assert_eq!(timer.expired().await, ticket);
        assert!(Instant::now() >= timer.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_armed_never_fires() {
        let mut timer = None;
        let waited =
            tokio::time::timeout(Duration::from_secs(60), ScheduledAdvance::next(&mut timer)).await;
        assert!(waited.is_err());
    }
}
