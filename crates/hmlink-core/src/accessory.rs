// ── Accessory reconciliation ──
//
// One task per device reconciles the optimistic value shown to the
// accessory side with what the hub confirms. Commands are written
// immediately and displayed optimistically; the hub is re-read only after a
// grace period, because a read straight after a write returns the
// pre-actuation value.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Timing;
use crate::error::CoreError;
use crate::model::{Capability, Device, DeviceInfo};
use crate::refresh::{RefreshReason, RefreshSchedule, RefreshSignal, RefreshTrigger};

const COMMAND_CHANNEL_SIZE: usize = 8;

/// Where a device is in the write/confirm cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Idle,
    /// A write went out; the displayed value is optimistic until the next
    /// refresh.
    AwaitingConfirmation,
}

/// What the accessory side should currently display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedState {
    /// Current value on the accessory scale. `None` until the first read
    /// succeeds, so nothing is shown as a made-up zero.
    pub value: Option<i64>,
    /// Target position (positional devices only). Seeded from the first
    /// read so the accessory does not show a phantom movement.
    pub target: Option<i64>,
    pub phase: Phase,
    pub last_refresh: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for DisplayedState {
    fn default() -> Self {
        Self {
            value: None,
            target: None,
            phase: Phase::Idle,
            last_refresh: None,
            last_error: None,
        }
    }
}

/// Collaborator-facing handle for one bridged device.
///
/// The accessory transport reads [`DisplayedState`] through
/// [`subscribe`](Self::subscribe) and delivers remote updates through
/// [`command`](Self::command).
#[derive(Debug, Clone)]
pub struct AccessoryHandle {
    info: DeviceInfo,
    state: watch::Receiver<DisplayedState>,
    commands: mpsc::Sender<i64>,
    refresh: RefreshTrigger,
}

impl AccessoryHandle {
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn address(&self) -> &str {
        &self.info.address
    }

    pub fn capability(&self) -> Capability {
        self.info.capability
    }

    /// Snapshot of the displayed state.
    pub fn state(&self) -> DisplayedState {
        self.state.borrow().clone()
    }

    /// Change notifications for the displayed state.
    pub fn subscribe(&self) -> watch::Receiver<DisplayedState> {
        self.state.clone()
    }

    /// Deliver a remote update carrying a target value.
    pub async fn command(&self, value: i64) -> Result<(), CoreError> {
        if !self.info.capability.accepts(value) {
            return Err(CoreError::InvalidValue {
                message: format!(
                    "{value} is out of range for a {} device",
                    self.info.capability
                ),
            });
        }
        self.commands
            .send(value)
            .await
            .map_err(|_| CoreError::Internal(format!("device task for {} stopped", self.info.address)))
    }

    /// Ask for an immediate re-read.
    pub fn refresh_now(&self) {
        self.refresh.fire(RefreshReason::Manual);
    }
}

/// Spawn the reconciliation task for `device` and return its handle.
///
/// The task runs until `cancel` fires.
pub(crate) fn spawn_device(
    device: Device,
    timing: Timing,
    cancel: &CancellationToken,
) -> Result<(AccessoryHandle, tokio::task::JoinHandle<()>), CoreError> {
    let schedule = RefreshSchedule::new(timing.refresh_interval, cancel)?;
    let (state_tx, state_rx) = watch::channel(DisplayedState::default());
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

    let handle = AccessoryHandle {
        info: device.info(),
        state: state_rx,
        commands: command_tx,
        refresh: schedule.trigger(),
    };

    let task = DeviceTask {
        device,
        timing,
        state: state_tx,
        commands: command_rx,
        schedule,
        cancel: cancel.clone(),
    };

    Ok((handle, tokio::spawn(task.run())))
}

struct DeviceTask {
    device: Device,
    timing: Timing,
    state: watch::Sender<DisplayedState>,
    commands: mpsc::Receiver<i64>,
    schedule: RefreshSchedule,
    cancel: CancellationToken,
}

impl DeviceTask {
    async fn run(mut self) {
        // Show hub truth as soon as possible instead of a default.
        self.schedule.trigger().fire(RefreshReason::Initial);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(value) = self.commands.recv() => self.apply_command(value).await,
                signal = self.schedule.next() => match signal {
                    Some(signal) => self.refresh(signal).await,
                    None => break,
                },
            }
        }

        self.schedule.shutdown();
        debug!(device = %self.device, "device task stopped");
    }

    async fn apply_command(&mut self, value: i64) {
        info!(device = %self.device, value, "setting value");
        let positional = self.device.capability() == Capability::Positional;

        match self.device.set_value(value).await {
            Ok(()) => self.state.send_modify(|s| {
                s.value = Some(value);
                if positional {
                    s.target = Some(value);
                }
                s.phase = Phase::AwaitingConfirmation;
                s.last_error = None;
            }),
            Err(e) => {
                warn!(device = %self.device, value, error = %e, "could not set value");
                self.state.send_modify(|s| {
                    s.phase = Phase::AwaitingConfirmation;
                    s.last_error = Some(e.to_string());
                });
            }
        }

        let delay = self.timing.grace_period * self.device.capability().grace_multiplier();
        // Detached: the timer is cancelled together with the schedule.
        let _ = self.schedule.trigger().fire_after(delay, RefreshReason::Grace);
    }

    async fn refresh(&mut self, signal: RefreshSignal) {
        debug!(device = %self.device, reason = %signal.reason, "refreshing");
        let positional = self.device.capability() == Capability::Positional;

        match self.device.value().await {
            Ok(value) => self.state.send_modify(|s| {
                s.value = Some(value);
                if positional && s.target.is_none() {
                    s.target = Some(value);
                }
                s.phase = Phase::Idle;
                s.last_refresh = Some(Utc::now());
                s.last_error = None;
            }),
            Err(e) => {
                warn!(device = %self.device, error = %e, "could not retrieve current value");
                self.state.send_modify(|s| {
                    s.phase = Phase::Idle;
                    s.last_error = Some(e.to_string());
                });
            }
        }
    }
}
