//! `get` / `set`: one-off reads and writes of a single device.

use serde::Serialize;

use hmlink_core::{Bridge, Capability, directory};

use crate::cli::{GetArgs, GlobalOpts, SetArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ValueReport {
    address: String,
    room: String,
    capability: Capability,
    value: i64,
}

#[derive(Debug, Serialize)]
struct WriteReport {
    address: String,
    requested: i64,
    /// Hub reading after the grace period, when `--wait` was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmed: Option<i64>,
}

pub async fn get(args: GetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let bridge_config = config::bridge_config(global)?;

    let report = Bridge::oneshot(&bridge_config, |devices| async move {
        let device = directory::find_device(&devices, &args.address)?;
        Ok(ValueReport {
            address: device.address().to_owned(),
            room: device.room().to_owned(),
            capability: device.capability(),
            value: device.value().await?,
        })
    })
    .await?;

    let out = output::render_single(
        global.output,
        &report,
        |r| {
            [
                format!("Address:    {}", r.address),
                format!("Room:       {}", if r.room.is_empty() { "-" } else { &r.room }),
                format!("Capability: {}", r.capability),
                format!("Value:      {}", r.value),
            ]
            .join("\n")
        },
        |r| r.value.to_string(),
    )?;
    output::print_output(&out);
    Ok(())
}

pub async fn set(args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let bridge_config = config::bridge_config(global)?;
    let grace_period = bridge_config.timing.grace_period;

    let report = Bridge::oneshot(&bridge_config, |devices| async move {
        let device = directory::find_device(&devices, &args.address)?;
        device.set_value(args.value).await?;

        let confirmed = if args.wait {
            tokio::time::sleep(grace_period * device.capability().grace_multiplier()).await;
            Some(device.value().await?)
        } else {
            None
        };

        Ok(WriteReport {
            address: device.address().to_owned(),
            requested: args.value,
            confirmed,
        })
    })
    .await?;

    let out = output::render_single(
        global.output,
        &report,
        |r| match r.confirmed {
            Some(v) => format!("{}: set {}, hub reports {v}", r.address, r.requested),
            None => format!("{}: set {}", r.address, r.requested),
        },
        |r| r.confirmed.unwrap_or(r.requested).to_string(),
    )?;
    output::print_output(&out);
    Ok(())
}
