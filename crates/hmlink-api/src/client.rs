// JSON-RPC HTTP client for the CCU
//
// Wraps `reqwest::Client` with endpoint construction, session token
// injection, and envelope unwrapping. Endpoint families (session, hub
// topology, values) are implemented as inherent methods in separate files
// to keep this module focused on transport mechanics.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{JSON_RPC_VERSION, RpcRequest, RpcResponse};
use crate::transport::TransportConfig;

/// Device interface identifier of the BidCos-RF protocol family.
pub const DEFAULT_INTERFACE: &str = "BidCos-RF";

/// Implicit parameter carrying the session token.
pub(crate) const SESSION_PARAM: &str = "_session_id_";

const ENDPOINT_PATH: &str = "/api/homematic.cgi";

/// Request parameters. The CCU only accepts string values.
pub type Params = BTreeMap<String, String>;

/// Build a [`Params`] map from literal pairs.
pub fn params<const N: usize>(pairs: [(&str, &str); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

/// Raw HTTP client for the CCU's JSON-RPC endpoint.
///
/// Every call, including login, renewal and logout, goes through
/// [`call`](Self::call), so error mapping and token injection are uniform.
/// The session token lives in an [`ArcSwapOption`]: renewal and ordinary
/// calls may touch it concurrently without locking.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    interface: String,
    session: ArcSwapOption<SecretString>,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("interface", &self.interface)
            .field("has_session", &self.has_session())
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Create a new client from a hub address and a `TransportConfig`.
    ///
    /// `address` may be a bare host (`ccu.local`, `192.168.1.20:8080`),
    /// which implies plain HTTP, or a full `http(s)://` URL.
    pub fn new(
        address: &str,
        interface: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, address, interface)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        address: &str,
        interface: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            endpoint: endpoint_url(address)?,
            interface: interface.into(),
            session: ArcSwapOption::empty(),
        })
    }

    /// The full RPC endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The hub device-interface identifier passed to interface-scoped methods.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Whether a session token is currently held.
    pub fn has_session(&self) -> bool {
        self.session.load().is_some()
    }

    /// The current session token, if any.
    pub fn session_token(&self) -> Option<Arc<SecretString>> {
        self.session.load_full()
    }

    pub(crate) fn store_session(&self, token: Option<SecretString>) {
        trace!(present = token.is_some(), "storing session token");
        self.session.store(token.map(Arc::new));
    }

    /// Issue one RPC call and decode its result into `T`.
    ///
    /// Injects `_session_id_` when a session is held. Transport failures,
    /// malformed envelopes and hub-reported errors come back as distinct
    /// [`Error`] variants; nothing is retried here.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        mut params: Params,
    ) -> Result<T, Error> {
        if let Some(token) = self.session.load_full() {
            params.insert(SESSION_PARAM.to_owned(), token.expose_secret().to_owned());
        }

        let request = RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            method,
            params: &params,
        };

        debug!(method, "POST {}", self.endpoint);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = resp.text().await?;
        let envelope: RpcResponse =
            serde_json::from_str(&body).map_err(|e| deserialization(&e, body.clone()))?;

        if let Some(err) = envelope.error {
            return Err(Error::Rpc {
                method: method.to_owned(),
                message: describe_error(&err),
            });
        }

        serde_json::from_value(envelope.result).map_err(|e| deserialization(&e, body))
    }
}

/// Resolve the RPC endpoint from a hub address.
fn endpoint_url(address: &str) -> Result<Url, Error> {
    let address = address.trim().trim_end_matches('/');
    let base = if address.contains("://") {
        Url::parse(address)?
    } else {
        Url::parse(&format!("http://{address}"))?
    };
    Ok(base.join(ENDPOINT_PATH)?)
}

fn deserialization(err: &serde_json::Error, body: String) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body,
    }
}

/// Render the hub's error payload. The CCU sends
/// `{"name": "JSONRPCError", "code": N, "message": "..."}`.
fn describe_error(err: &serde_json::Value) -> String {
    let message = err.get("message").and_then(serde_json::Value::as_str);
    let code = err.get("code").and_then(serde_json::Value::as_i64);
    match (message, code) {
        (Some(msg), Some(code)) => format!("{msg} (code {code})"),
        (Some(msg), None) => msg.to_owned(),
        _ => err.to_string(),
    }
}
