// ── Core error types ──
//
// User-facing errors from hmlink-core. Consumers never see reqwest errors
// or JSON parse failures directly: the `From<hmlink_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach hub at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Hub request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {address}")]
    DeviceNotFound { address: String },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    // ── Hub errors (wrapped, not exposed raw) ────────────────────────
    #[error("Hub error: {message}")]
    Rpc { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hmlink_api::Error> for CoreError {
    fn from(err: hmlink_api::Error) -> Self {
        match err {
            hmlink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            hmlink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rpc {
                        message: e.to_string(),
                    }
                }
            }
            hmlink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid hub address: {e}"),
            },
            hmlink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            hmlink_api::Error::Config(message) => CoreError::Config { message },
            hmlink_api::Error::Rpc { method, message } => CoreError::Rpc {
                message: format!("{method}: {message}"),
            },
            hmlink_api::Error::ValueParse { value } => CoreError::InvalidValue {
                message: format!("hub returned non-numeric value {value:?}"),
            },
            hmlink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
