//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hmlink_config::ConfigError;
use hmlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to hub at {url}")]
    #[diagnostic(
        code(hmlink::connection_failed),
        help(
            "Check that the CCU is running and reachable.\n\
             Reason: {reason}\n\
             For https with a self-signed certificate try --insecure."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Hub request timed out")]
    #[diagnostic(
        code(hmlink::timeout),
        help("Increase timeout with --timeout or check the CCU's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(hmlink::auth_failed),
        help(
            "Verify the CCU user and password.\n\
             Set them with HM_CCU_USER / HM_CCU_PASSWORD or in the [hub] config section."
        )
    )]
    AuthFailed { message: String },

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device '{address}' not found")]
    #[diagnostic(
        code(hmlink::not_found),
        help("Run: hmlink devices to see bridged devices")
    )]
    NotFound { address: String },

    // ── Hub ──────────────────────────────────────────────────────────
    #[error("Hub error: {message}")]
    #[diagnostic(code(hmlink::hub_error))]
    Hub { message: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hmlink::validation))]
    Validation { field: String, reason: String },

    #[error("No hub address configured")]
    #[diagnostic(
        code(hmlink::no_address),
        help(
            "Pass --address, set HM_CCU_ADDRESS, or add `address` to the [hub] section of\n\
             {path}"
        )
    )]
    MissingAddress { path: String },

    #[error(transparent)]
    #[diagnostic(code(hmlink::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hmlink::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::MissingAddress { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::DeviceNotFound { address } => CliError::NotFound { address },
            CoreError::InvalidValue { message } => CliError::Validation {
                field: "value".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Rpc { message } | CoreError::Internal(message) => {
                CliError::Hub { message }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingAddress => CliError::MissingAddress {
                path: hmlink_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}
