// ── Refresh scheduling ──
//
// One schedule per device: a periodic producer plus on-demand triggers
// ("refresh now", "refresh after the grace period"), all feeding a single
// consumer.
//
// Coalescing guarantee: signals travel through a `watch` slot. Producers
// overwrite the slot and never wait; the consumer sees at most one pending
// signal, the most recent. A refresh re-reads current hub state, so signals
// dropped by overwriting carry no information the surviving one lacks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefreshReason {
    /// First read after the device task starts.
    Initial,
    /// Recurring poll.
    Periodic,
    /// Confirmation read after a write.
    Grace,
    /// Requested from outside (CLI, accessory collaborator).
    Manual,
}

/// A timestamped request to re-read a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSignal {
    pub at: DateTime<Utc>,
    pub reason: RefreshReason,
}

impl RefreshSignal {
    fn now(reason: RefreshReason) -> Self {
        Self {
            at: Utc::now(),
            reason,
        }
    }
}

/// Producer side of a [`RefreshSchedule`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    slot: Arc<watch::Sender<Option<RefreshSignal>>>,
    cancel: CancellationToken,
}

impl RefreshTrigger {
    /// Request a refresh immediately. Never blocks.
    pub fn fire(&self, reason: RefreshReason) {
        self.slot.send_replace(Some(RefreshSignal::now(reason)));
    }

    /// Request a refresh after `delay`.
    ///
    /// The timer is dropped if the schedule shuts down first, so no signal
    /// outlives its device.
    pub fn fire_after(&self, delay: Duration, reason: RefreshReason) -> JoinHandle<()> {
        let trigger = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = trigger.cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => trigger.fire(reason),
            }
        })
    }
}

/// Consumer side: a periodic refresh source with injectable extra signals.
#[derive(Debug)]
pub struct RefreshSchedule {
    rx: watch::Receiver<Option<RefreshSignal>>,
    trigger: RefreshTrigger,
    ticker: JoinHandle<()>,
}

impl RefreshSchedule {
    /// Start the periodic producer. The first periodic signal arrives one
    /// full `period` after creation; use [`RefreshTrigger::fire`] for an
    /// immediate one.
    ///
    /// A zero `period` is rejected with [`CoreError::Config`].
    pub fn new(period: Duration, cancel: &CancellationToken) -> Result<Self, CoreError> {
        if period.is_zero() {
            return Err(CoreError::Config {
                message: "refresh interval must be non-zero".into(),
            });
        }
        let (tx, rx) = watch::channel(None);
        let trigger = RefreshTrigger {
            slot: Arc::new(tx),
            cancel: cancel.child_token(),
        };
        let ticker = tokio::spawn(periodic_task(trigger.clone(), period));
        Ok(Self {
            rx,
            trigger,
            ticker,
        })
    }

    /// A handle for injecting signals.
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    /// Wait for the next signal.
    ///
    /// Returns `None` once every producer is gone.
    pub async fn next(&mut self) -> Option<RefreshSignal> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(signal) = *self.rx.borrow_and_update() {
                return Some(signal);
            }
        }
    }

    /// Stop the periodic producer and any pending delayed signals.
    pub fn shutdown(&self) {
        self.trigger.cancel.cancel();
    }

    /// Whether the periodic producer has exited.
    pub fn is_stopped(&self) -> bool {
        self.ticker.is_finished()
    }
}

impl Drop for RefreshSchedule {
    fn drop(&mut self) {
        self.trigger.cancel.cancel();
    }
}

async fn periodic_task(trigger: RefreshTrigger, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = trigger.cancel.cancelled() => break,
            _ = interval.tick() => trigger.fire(RefreshReason::Periodic),
        }
    }
}
