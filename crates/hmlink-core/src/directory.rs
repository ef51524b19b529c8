// ── Device directory ──
//
// Turns the hub's device/channel topology into `Device` handles. Rooms
// only label devices; losing them must never lose devices.

use std::sync::Arc;

use hmlink_api::{HubChannel, HubDevice, Room, RpcClient};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{Capability, Device};

/// Query the hub and build a `Device` for every supported channel.
///
/// The topology call is required; the room call is best-effort and falls
/// back to unlabelled devices.
pub async fn list_devices(client: &Arc<RpcClient>) -> Result<Vec<Device>, CoreError> {
    let hub_devices = client.list_devices().await?;

    let rooms = match client.list_rooms().await {
        Ok(rooms) => rooms,
        Err(e) => {
            warn!(error = %e, "could not retrieve room list, continuing without rooms");
            Vec::new()
        }
    };

    let devices = build_devices(&hub_devices, &rooms, client);
    info!(
        channels = hub_devices.iter().map(|d| d.channels.len()).sum::<usize>(),
        devices = devices.len(),
        "device directory built"
    );
    Ok(devices)
}

/// Map hub topology to devices, preserving listing order (channel-major
/// within each hub device). Unsupported channel types are skipped.
pub fn build_devices(
    hub_devices: &[HubDevice],
    rooms: &[Room],
    client: &Arc<RpcClient>,
) -> Vec<Device> {
    hub_devices
        .iter()
        .flat_map(|dev| dev.channels.iter())
        .filter_map(|channel| {
            let Some(capability) = Capability::from_channel_type(&channel.channel_type) else {
                debug!(
                    address = %channel.address,
                    channel_type = %channel.channel_type,
                    "skipping unsupported channel"
                );
                return None;
            };
            Some(Device::new(
                capability,
                channel.address.clone(),
                associate_room(rooms, channel),
                Arc::clone(client),
            ))
        })
        .collect()
}

/// The first device bound to `address`.
pub fn find_device<'a>(devices: &'a [Device], address: &str) -> Result<&'a Device, CoreError> {
    devices
        .iter()
        .find(|d| d.address() == address)
        .ok_or_else(|| CoreError::DeviceNotFound {
            address: address.to_owned(),
        })
}

/// Name of the first room listing `channel`, or an empty string.
pub fn associate_room(rooms: &[Room], channel: &HubChannel) -> String {
    rooms
        .iter()
        .find(|room| room.channel_ids.iter().any(|id| *id == channel.id))
        .map(|room| room.name.clone())
        .unwrap_or_default()
}
