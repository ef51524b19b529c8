//! `devices`: list the bridged device directory.

use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use hmlink_core::{Bridge, DeviceInfo};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Capability")]
    capability: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Debug, Serialize)]
struct DeviceEntry {
    #[serde(flatten)]
    info: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
}

fn row(d: &DeviceEntry) -> DeviceRow {
    DeviceRow {
        address: d.info.address.clone(),
        room: d.info.room.clone(),
        capability: d.info.capability.to_string(),
        value: d.value.map_or_else(|| "-".into(), |v| v.to_string()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let bridge_config = config::bridge_config(global)?;

    let entries = Bridge::oneshot(&bridge_config, |devices| async move {
        let mut entries = Vec::with_capacity(devices.len());
        for device in &devices {
            let value = if args.values {
                match device.value().await {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(device = %device, error = %e, "could not read value");
                        None
                    }
                }
            } else {
                None
            };
            entries.push(DeviceEntry {
                info: device.info(),
                value,
            });
        }
        Ok(entries)
    })
    .await?;

    let out = output::render_list(global.output, &entries, row, |d| {
        d.info.address.clone()
    })?;
    output::print_output(&out);
    Ok(())
}
