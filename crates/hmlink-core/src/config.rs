// ── Runtime bridge configuration ──
//
// These types describe *how* to reach the hub and how often to poll it.
// They carry credential data and timing, but never touch disk. The binary
// constructs a `BridgeConfig` and hands it in.

use std::time::Duration;

use hmlink_api::{DEFAULT_INTERFACE, TlsMode};
use secrecy::SecretString;

/// Username used when none is configured.
pub const DEFAULT_USERNAME: &str = "Admin";

/// Poll and debounce timing shared by every device task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Period of the recurring refresh per device.
    pub refresh_interval: Duration,
    /// Delay between a write and the read that confirms it. Positional
    /// devices wait a multiple of this.
    pub grace_period: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
            grace_period: Duration::from_secs(5),
        }
    }
}

/// Configuration for bridging a single hub.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Hub address: bare host (implies `http://`) or full URL.
    pub address: String,
    pub username: String,
    pub password: SecretString,
    /// Hub device-interface identifier.
    pub interface: String,
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often the session is renewed.
    pub session_renew_interval: Duration,
    pub timing: Timing,
}

impl BridgeConfig {
    /// A config with default credentials and timing for `address`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            username: DEFAULT_USERNAME.into(),
            password: SecretString::from(String::new()),
            interface: DEFAULT_INTERFACE.into(),
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            session_renew_interval: hmlink_api::session::DEFAULT_RENEW_INTERVAL,
            timing: Timing::default(),
        }
    }
}
