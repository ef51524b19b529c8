//! Configuration for the hmlink bridge.
//!
//! Layers serialized defaults, a TOML file and the environment with figment,
//! then validates the result into a `hmlink_core::BridgeConfig`. The hub
//! credentials keep their long-standing variable names (`HM_CCU_ADDRESS`,
//! `HM_CCU_USER`, `HM_CCU_PASSWORD`); everything else can be set through
//! `HMLINK_<SECTION>__<KEY>`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hmlink_core::{BridgeConfig, DEFAULT_INTERFACE, DEFAULT_USERNAME, Timing, TlsMode};

/// Prefix for bridge tuning variables, e.g. `HMLINK_BRIDGE__GRACE_PERIOD`.
pub const ENV_PREFIX: &str = "HMLINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no hub address configured")]
    MissingAddress,

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// How to reach and authenticate with the hub.
    #[serde(default)]
    pub hub: HubSection,

    /// Poll and session timing.
    #[serde(default)]
    pub bridge: BridgeSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HubSection {
    /// Hub host or URL. A bare host implies plain HTTP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default = "default_user")]
    pub user: String,

    /// Password (plaintext; prefer `HM_CCU_PASSWORD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Hub device interface.
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Accept self-signed TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            address: None,
            user: default_user(),
            password: None,
            interface: default_interface(),
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

/// All values in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeSection {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    #[serde(default = "default_grace_period")]
    pub grace_period: u64,

    #[serde(default = "default_session_renew_interval")]
    pub session_renew_interval: u64,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            grace_period: default_grace_period(),
            session_renew_interval: default_session_renew_interval(),
        }
    }
}

fn default_user() -> String {
    DEFAULT_USERNAME.into()
}
fn default_interface() -> String {
    DEFAULT_INTERFACE.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    60
}
fn default_grace_period() -> u64 {
    5
}
fn default_session_renew_interval() -> u64 {
    60
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "hmlink", "hmlink").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("hmlink");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The layered provider chain: defaults, then the TOML file at `path` (or
/// the platform default), then the environment.
///
/// Callers may merge further providers, such as command-line overrides, on
/// top before extracting.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(prefixed_env().ignore(STRING_KEYS))
        .merge(as_strings(&prefixed_env()))
        .merge(as_strings(&ccu_env()))
}

/// Keys read from the environment verbatim. figment would otherwise parse
/// `0815` as an integer or `true` as a bool.
const STRING_KEYS: &[&str] = &["hub.address", "hub.user", "hub.password", "hub.interface"];

fn prefixed_env() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

/// The hub's conventional variables, mapped onto `[hub]` keys.
fn ccu_env() -> Env {
    Env::raw().filter_map(|key| {
        let mapped = match key.as_str().to_ascii_uppercase().as_str() {
            "HM_CCU_ADDRESS" => "hub.address",
            "HM_CCU_USER" => "hub.user",
            "HM_CCU_PASSWORD" => "hub.password",
            _ => return None,
        };
        Some(mapped.into())
    })
}

/// The [`STRING_KEYS`] set in `env`, as string values.
fn as_strings(env: &Env) -> Figment {
    env.iter()
        .filter(|(key, _)| STRING_KEYS.contains(&key.as_str()))
        .fold(Figment::new(), |figment, (key, value)| {
            figment.merge(Serialized::default(key.as_str(), value))
        })
}

/// Load the full Config from file + environment.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    Ok(config)
}

// ── Validation ──────────────────────────────────────────────────────

impl Config {
    /// Validate into the runtime configuration for `hmlink_core::Bridge`.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        let address = self
            .hub
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(ConfigError::MissingAddress)?;

        let positive = |field: &str, secs: u64| {
            if secs == 0 {
                Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be at least 1 second".into(),
                })
            } else {
                Ok(Duration::from_secs(secs))
            }
        };

        let tls = if self.hub.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.hub.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        let mut config = BridgeConfig::new(address);
        config.username.clone_from(&self.hub.user);
        config.password = SecretString::from(self.hub.password.clone().unwrap_or_default());
        config.interface.clone_from(&self.hub.interface);
        config.tls = tls;
        config.timeout = positive("hub.timeout", self.hub.timeout)?;
        config.session_renew_interval =
            positive("bridge.session_renew_interval", self.bridge.session_renew_interval)?;
        config.timing = Timing {
            refresh_interval: positive("bridge.refresh_interval", self.bridge.refresh_interval)?,
            grace_period: Duration::from_secs(self.bridge.grace_period),
        };
        Ok(config)
    }

    /// A copy safe to print: the password is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.hub.password.is_some() {
            copy.hub.password = Some("****".into());
        }
        copy
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
