// ── Domain model ──

pub mod device;

pub use device::{Capability, Device, DeviceInfo};
