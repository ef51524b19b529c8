//! `serve`: run the bridge until Ctrl-C.
//!
//! Without an accessory transport attached, every displayed-state change is
//! logged instead.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use hmlink_core::{AccessoryHandle, Bridge};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let bridge_config = config::bridge_config(global)?;
    let bridge = Bridge::start(&bridge_config).await?;

    let cancel = CancellationToken::new();
    let sinks: Vec<JoinHandle<()>> = bridge
        .accessories()
        .iter()
        .map(|handle| tokio::spawn(log_updates(handle.clone(), cancel.clone())))
        .collect();

    info!(
        accessories = sinks.len(),
        "bridge running, press Ctrl-C to stop"
    );

    let signal = tokio::signal::ctrl_c().await;
    if let Err(ref e) = signal {
        warn!(error = %e, "could not listen for Ctrl-C, shutting down");
    }
    info!("shutting down");

    cancel.cancel();
    for sink in sinks {
        let _ = sink.await;
    }
    bridge.shutdown().await;

    signal?;
    Ok(())
}

/// Logging accessory sink: report each displayed-state change.
async fn log_updates(handle: AccessoryHandle, cancel: CancellationToken) {
    let mut rx = handle.subscribe();
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                info!(
                    device = handle.address(),
                    capability = %handle.capability(),
                    value = ?state.value,
                    target = ?state.target,
                    phase = %state.phase,
                    error = state.last_error.as_deref(),
                    "accessory updated"
                );
            }
        }
    }
}
