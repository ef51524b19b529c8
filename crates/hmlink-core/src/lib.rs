//! Device model and accessory reconciliation between `hmlink-api` and an
//! accessory transport.
//!
//! - **[`Bridge`]**: supervisor owning the hub session and one task per
//!   device. [`Bridge::start`] logs in, discovers devices and spawns the
//!   tasks; [`Bridge::oneshot`] runs a single closure against the
//!   discovered devices for CLI use.
//!
//! - **[`Device`]**: a supported hub channel with a [`Capability`] that
//!   fixes its value key, scaling and settle time.
//!
//! - **[`AccessoryHandle`]**: what an accessory transport holds per device.
//!   Exposes the optimistic [`DisplayedState`] through a `watch` channel and
//!   accepts remote commands.
//!
//! - **[`RefreshSchedule`]**: per-device periodic and on-demand refresh
//!   signals, coalesced so producers never block.

pub mod accessory;
pub mod bridge;
pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod refresh;

// ── Primary re-exports ──────────────────────────────────────────────
pub use accessory::{AccessoryHandle, DisplayedState, Phase};
pub use bridge::Bridge;
pub use config::{BridgeConfig, DEFAULT_USERNAME, Timing};
pub use error::CoreError;
pub use hmlink_api::{DEFAULT_INTERFACE, TlsMode};
pub use model::{Capability, Device, DeviceInfo};
pub use refresh::{RefreshReason, RefreshSchedule, RefreshSignal, RefreshTrigger};
