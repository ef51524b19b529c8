use thiserror::Error;

/// Top-level error type for the `hmlink-api` crate.
///
/// Covers every failure mode of a hub conversation: transport, envelope
/// decoding, hub-reported errors, value parsing, and authentication.
/// `hmlink-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected by the hub (wrong credentials, no token issued).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, timeout, non-2xx status).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A caller-supplied setting the client cannot work with.
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Response was not a valid envelope, or its result had an unexpected
    /// shape. Carries the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The hub answered with a non-null `error` member.
    #[error("{method} failed: {message}")]
    Rpc { method: String, message: String },

    /// A value expected to be numeric was not.
    #[error("Hub returned non-numeric value {value:?}")]
    ValueParse { value: String },
}
