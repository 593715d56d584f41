//! Cancellable one-second tick source.
//!
//! The timer is the only background activity in the system. It is owned by
//! whoever drives a session and must not outlive it: `stop()` cancels the
//! task, and dropping the timer cancels it too, so no tick callback dangles
//! past a win or a restart.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// A repeating tick task sending `()` on a channel once per period.
pub struct TickTimer {
    handle: JoinHandle<()>,
}

impl TickTimer {
    /// Start ticking once per second.
    pub fn start(tx: UnboundedSender<()>) -> Self {
        Self::start_with_period(tx, Duration::from_secs(1))
    }

    pub fn start_with_period(tx: UnboundedSender<()>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; a second of play
            // has to pass before the first real tick.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    debug!("tick receiver gone, timer task exiting");
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Cancel the tick task. Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
