use crate::config::JBossConfiguration;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Validates a single server configuration entry
pub fn validate_server_config(name: &str, config: &JBossConfiguration) -> Result<()> {
    // Only explicit values are checked, absent fields resolve to dialect defaults
    if config.port == Some(0) {
        return Err(Error::ConfigInvalid(format!("Server '{}' has port 0", name)));
    }

    if config.startup_timeout == Some(0) {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has a zero startup timeout",
            name
        )));
    }

    if matches!(&config.hostname, Some(hostname) if hostname.trim().is_empty()) {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has a blank hostname",
            name
        )));
    }

    if matches!(&config.version, Some(version) if version.trim().is_empty()) {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has a blank version",
            name
        )));
    }

    if config.jvm_args.iter().any(|arg| arg.trim().is_empty()) {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has a blank JVM argument",
            name
        )));
    }

    Ok(())
}

/// Validates a map of server configurations
pub fn validate_server_configs(configs: &HashMap<String, JBossConfiguration>) -> Result<()> {
    if configs.is_empty() {
        return Err(Error::ConfigInvalid("No servers configured".to_string()));
    }

    for (name, config) in configs {
        validate_server_config(name, config)?;
    }

    Ok(())
}

/// Full configuration validation
pub fn validate_config(configs: &HashMap<String, JBossConfiguration>) -> Result<()> {
    validate_server_configs(configs)?;

    Ok(())
}
