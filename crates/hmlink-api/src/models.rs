// ── Wire types for the CCU JSON-RPC API ──
//
// Request/response envelopes plus the topology payloads returned by
// `Room.getAll` and `Device.listAllDetail`. The CCU ships far more fields
// than listed here; serde ignores the rest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Protocol version sent with every request.
pub const JSON_RPC_VERSION: &str = "1.1";

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a BTreeMap<String, String>,
}

/// Incoming response envelope.
///
/// A non-null `error` invalidates `result`, whatever it contains.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// A room, as returned by `Room.getAll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub channel_ids: Vec<String>,
}

/// A physical device, as returned by `Device.listAllDetail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDevice {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub channels: Vec<HubChannel>,
}

/// One addressable channel of a [`HubDevice`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
    #[serde(default)]
    pub channel_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_listing_ignores_unknown_fields() {
        let raw = serde_json::json!([{
            "id": "1234",
            "name": "HM-LC-Sw1-FM NEQ0000001",
            "address": "NEQ0000001",
            "interface": "BidCos-RF",
            "type": "HM-LC-Sw1-FM",
            "operateGroupOnly": "false",
            "channels": [{
                "id": "1235",
                "address": "NEQ0000001:1",
                "deviceId": "1234",
                "index": 1,
                "channelType": "SWITCH",
                "isReadable": true
            }]
        }]);

        let devices: Vec<HubDevice> = serde_json::from_value(raw).expect("valid listing");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_type, "HM-LC-Sw1-FM");
        assert_eq!(devices[0].channels[0].channel_type, "SWITCH");
        assert_eq!(devices[0].channels[0].name, None);
    }

    #[test]
    fn envelope_with_missing_members_decodes_as_null() {
        let resp: RpcResponse = serde_json::from_str("{}").expect("empty object");
        assert!(resp.error.is_none());
        assert!(resp.result.is_null());
    }
}
