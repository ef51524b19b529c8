// ── Bridge supervisor ──
//
// Owns the hub session and one reconciliation task per device. Everything
// spawned here hangs off a single cancellation token, so `shutdown` (or
// dropping the bridge) stops renewal, polling and pending grace timers
// together.

use std::future::Future;
use std::sync::Arc;

use hmlink_api::{RpcClient, Session, TransportConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accessory::{AccessoryHandle, spawn_device};
use crate::config::{BridgeConfig, Timing};
use crate::directory;
use crate::error::CoreError;
use crate::model::Device;

/// A running bridge: an authenticated session plus one accessory per
/// supported hub channel.
#[derive(Debug)]
pub struct Bridge {
    session: Option<Session>,
    accessories: Vec<AccessoryHandle>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Bridge {
    /// Connect to the hub and start bridging.
    ///
    /// Logs in, discovers devices and spawns a reconciliation task for each.
    /// If discovery or spawning fails the fresh session is logged out before
    /// the error is returned.
    pub async fn start(config: &BridgeConfig) -> Result<Self, CoreError> {
        let cancel = CancellationToken::new();
        let session = open_session(config, &cancel).await?;

        let spawned = match directory::list_devices(session.client()).await {
            Ok(devices) => Self::spawn(devices, config.timing, cancel),
            Err(e) => Err(e),
        };
        let mut bridge = match spawned {
            Ok(bridge) => bridge,
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!(error = %close_err, "logout after failed startup failed");
                }
                return Err(e);
            }
        };
        bridge.session = Some(session);
        info!(
            accessories = bridge.accessories.len(),
            "bridge started"
        );
        Ok(bridge)
    }

    /// Bridge an already-built device list. No session is managed; the
    /// caller owns authentication for the devices' client.
    ///
    /// Fails with [`CoreError::Config`] on a zero refresh interval.
    pub fn from_devices(devices: Vec<Device>, timing: Timing) -> Result<Self, CoreError> {
        Self::spawn(devices, timing, CancellationToken::new())
    }

    fn spawn(
        devices: Vec<Device>,
        timing: Timing,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError> {
        let spawned = devices
            .into_iter()
            .map(|device| spawn_device(device, timing, &cancel))
            .collect::<Result<Vec<_>, _>>();
        let (accessories, tasks) = match spawned {
            Ok(spawned) => spawned.into_iter().unzip(),
            Err(e) => {
                cancel.cancel();
                return Err(e);
            }
        };
        Ok(Self {
            session: None,
            accessories,
            cancel,
            tasks,
        })
    }

    /// Every bridged accessory, in discovery order.
    pub fn accessories(&self) -> &[AccessoryHandle] {
        &self.accessories
    }

    /// The first accessory bound to `address`.
    pub fn accessory(&self, address: &str) -> Result<&AccessoryHandle, CoreError> {
        self.accessories
            .iter()
            .find(|a| a.address() == address)
            .ok_or_else(|| CoreError::DeviceNotFound {
                address: address.to_owned(),
            })
    }

    /// Stop every device task, then end the session.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();

        for handle in self.tasks.drain(..) {
            let _ = handle.await;
        }

        if let Some(session) = self.session.take() {
            if let Err(e) = session.close().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        }
        debug!("bridge stopped");
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: log in, discover devices, run `f`, log out.
    ///
    /// No device tasks are spawned; `f` talks to the hub through the
    /// [`Device`] accessors directly.
    pub async fn oneshot<F, Fut, T>(config: &BridgeConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Vec<Device>) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let cancel = CancellationToken::new();
        let session = open_session(config, &cancel).await?;

        let result = match directory::list_devices(session.client()).await {
            Ok(devices) => f(devices).await,
            Err(e) => Err(e),
        };

        if let Err(e) = session.close().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }
        result
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn open_session(
    config: &BridgeConfig,
    cancel: &CancellationToken,
) -> Result<Session, CoreError> {
    let transport = TransportConfig {
        tls: config.tls.clone(),
        timeout: config.timeout,
    };
    let client = Arc::new(RpcClient::new(
        &config.address,
        config.interface.clone(),
        &transport,
    )?);
    debug!(endpoint = %client.endpoint(), "connecting to hub");

    let session = Session::start(
        client,
        &config.username,
        &config.password,
        config.session_renew_interval,
        cancel,
    )
    .await?;
    Ok(session)
}
