// Hub topology and value endpoints
//
// Rooms, the device/channel listing, and the generic per-channel value
// accessors. Values travel as strings in both directions.

use tracing::debug;

use crate::client::{Params, RpcClient, params};
use crate::error::Error;
use crate::models::{HubDevice, Room};

impl RpcClient {
    /// List all rooms with their channel associations (`Room.getAll`).
    pub async fn list_rooms(&self) -> Result<Vec<Room>, Error> {
        self.call("Room.getAll", Params::new()).await
    }

    /// List every device with its channels on this client's interface
    /// (`Device.listAllDetail`).
    pub async fn list_devices(&self) -> Result<Vec<HubDevice>, Error> {
        let devices: Vec<HubDevice> = self
            .call(
                "Device.listAllDetail",
                params([("interface", self.interface())]),
            )
            .await?;
        debug!(count = devices.len(), "listed hub devices");
        Ok(devices)
    }

    /// Read a channel value and parse it as a number (`Interface.getValue`).
    ///
    /// Every read is a fresh round trip; nothing is cached.
    pub async fn get_value(&self, address: &str, key: &str) -> Result<f64, Error> {
        let raw: String = self
            .call(
                "Interface.getValue",
                params([
                    ("interface", self.interface()),
                    ("address", address),
                    ("valueKey", key),
                ]),
            )
            .await?;
        parse_value(&raw)
    }

    /// Write a channel value (`Interface.setValue`).
    pub async fn set_value(
        &self,
        address: &str,
        key: &str,
        value_type: &str,
        value: &str,
    ) -> Result<(), Error> {
        debug!(address, key, value, "setting value");
        let _: serde_json::Value = self
            .call(
                "Interface.setValue",
                params([
                    ("interface", self.interface()),
                    ("address", address),
                    ("valueKey", key),
                    ("type", value_type),
                    ("value", value),
                ]),
            )
            .await?;
        Ok(())
    }
}

fn parse_value(raw: &str) -> Result<f64, Error> {
    raw.trim().parse().map_err(|_| Error::ValueParse {
        value: raw.to_owned(),
    })
}
