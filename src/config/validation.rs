//! Compiled-configuration validation

use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a compiled configuration.
///
/// The core never crashes on a well-formed configuration; everything that
/// can be rejected up front is rejected here.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "No seed URLs after expansion".into(),
        ));
    }

    for seed in &config.seeds {
        let parsed = Url::parse(seed).map_err(|e| {
            ConfigError::Validation(format!("Seed '{}' is not a valid URL: {}", seed, e))
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Seed '{}' has unsupported scheme '{}', prefix http or https is required",
                    seed, other
                )));
            }
        }
    }

    if config.download && config.naming_pattern.is_empty() {
        return Err(ConfigError::Validation(
            "Download mode requires a naming pattern".into(),
        ));
    }

    Ok(())
}
