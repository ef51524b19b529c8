//! Command-line overrides on top of the shared config layers.

use figment::providers::Serialized;

use hmlink_config::Config;
use hmlink_core::BridgeConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the effective config: file and environment, then any flags given.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut figment = hmlink_config::figment(global.config.as_deref());

    if let Some(ref address) = global.address {
        figment = figment.merge(Serialized::default("hub.address", address));
    }
    if let Some(ref user) = global.user {
        figment = figment.merge(Serialized::default("hub.user", user));
    }
    if let Some(ref password) = global.password {
        figment = figment.merge(Serialized::default("hub.password", password));
    }
    if global.insecure {
        figment = figment.merge(Serialized::default("hub.insecure", true));
    }
    if let Some(timeout) = global.timeout {
        figment = figment.merge(Serialized::default("hub.timeout", timeout));
    }

    Ok(figment.extract()?)
}

/// Load and validate into a `BridgeConfig`.
pub fn bridge_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let config = load(global)?;
    Ok(config.to_bridge_config()?)
}
