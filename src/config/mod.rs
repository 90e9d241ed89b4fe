//! Configuration for a crawl run
//!
//! A [`RawConfig`] comes from a TOML file, CLI flags, or both (flags win);
//! [`compile`] turns it into the read-only [`Config`] the core consumes,
//! and [`validate`] rejects everything that can be rejected up front.

mod parser;
mod types;
mod validation;

pub use parser::{compile, load_raw_config};
pub use types::{
    Config, RawConfig, DEFAULT_NAMING_CAPTURE, DEFAULT_NAMING_PATTERN, DEFAULT_USER_AGENT,
    MATCH_ALL, MATCH_NOTHING,
};
pub use validation::validate;

use crate::ConfigError;

/// Compiles and validates a raw configuration in one step.
pub fn build_config(raw: RawConfig) -> Result<Config, ConfigError> {
    let config = compile(raw)?;
    validate(&config)?;
    Ok(config)
}
