// hmlink-api: Async Rust client for the Homematic CCU JSON-RPC API

pub mod client;
pub mod error;
pub mod hub;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{DEFAULT_INTERFACE, Params, RpcClient};
pub use error::Error;
pub use models::{HubChannel, HubDevice, Room};
pub use session::Session;
pub use transport::{TlsMode, TransportConfig};
