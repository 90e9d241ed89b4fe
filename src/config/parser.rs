//! Raw configuration loading and compilation
//!
//! `@`-prefixed values reference files: a seed pattern file has one pattern
//! per line, a header file one `Key: Value` entry per line. Blank lines are
//! ignored in both.

use crate::config::types::{Config, RawConfig, DEFAULT_USER_AGENT};
use crate::permute::expand;
use crate::ConfigError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Loads a raw configuration from a TOML file.
pub fn load_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let raw: RawConfig = toml::from_str(&content)?;
    Ok(raw)
}

/// Compiles a raw configuration into the read-only form the core consumes.
///
/// Seed patterns are expanded, header sources merged, and all filter and
/// naming regexes compiled. Validation runs separately afterwards.
pub fn compile(raw: RawConfig) -> Result<Config, ConfigError> {
    let url = raw
        .url
        .ok_or_else(|| ConfigError::Validation("Mandatory value 'url' was not defined".into()))?;

    let seeds = resolve_seeds(&url)?;
    let headers = resolve_headers(&raw.headers, raw.auth.as_deref(), raw.user_agent.as_deref())?;

    Ok(Config {
        seeds,
        max_depth: raw.depth,
        timeout: Duration::from_millis(raw.timeout),
        extra_wait: Duration::from_millis(raw.extra_waittime),
        headers,
        include: compile_regex(&raw.include, "include")?,
        exclude: compile_regex(&raw.exclude, "exclude")?,
        follow_include: compile_regex(&raw.follow_include, "follow-include")?,
        follow_exclude: compile_regex(&raw.follow_exclude, "follow-exclude")?,
        download: raw.download,
        naming_capture: compile_regex(&raw.naming_capture, "naming-capture")?,
        naming_capture_folders: raw.naming_capture_folders,
        naming_pattern: raw.naming_pattern,
        reconnect_attempts: raw.reconnect_attempts,
        skip_existing: raw.skip_existing,
    })
}

fn compile_regex(pattern: &str, name: &'static str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex { name, source })
}

/// Turns the seed value into concrete URLs: reads `@file` references and
/// runs every pattern through the permutation expander.
fn resolve_seeds(url: &str) -> Result<Vec<String>, ConfigError> {
    let mut seeds = Vec::new();
    if let Some(path) = url.strip_prefix('@') {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileRef(path.to_string()))?;
        for line in content.lines() {
            let pattern = line.trim();
            if !pattern.is_empty() {
                seeds.extend(expand(pattern));
            }
        }
    } else {
        seeds.extend(expand(url));
    }
    Ok(seeds)
}

/// Merges header entries, the auth flag, and the user-agent flag into one
/// normalized map. Later entries overwrite earlier ones for the same key.
fn resolve_headers(
    entries: &[String],
    auth: Option<&str>,
    user_agent: Option<&str>,
) -> Result<HashMap<String, String>, ConfigError> {
    let mut headers = HashMap::new();

    for entry in entries {
        if let Some(path) = entry.strip_prefix('@') {
            let content = std::fs::read_to_string(path)
                .map_err(|_| ConfigError::FileRef(path.to_string()))?;
            for line in content.lines() {
                parse_header_entry(line, &mut headers)?;
            }
        } else {
            parse_header_entry(entry, &mut headers)?;
        }
    }

    if let Some(auth) = auth {
        let encoded = BASE64.encode(auth.as_bytes());
        headers.insert("authorization".to_string(), format!("Basic {}", encoded));
    }

    match user_agent {
        None => {
            headers.insert("user-agent".to_string(), DEFAULT_USER_AGENT.to_string());
        }
        Some(ua) if ua.eq_ignore_ascii_case("none") => {}
        Some(ua) => {
            headers.insert("user-agent".to_string(), ua.to_string());
        }
    }

    Ok(headers)
}

fn parse_header_entry(
    entry: &str,
    headers: &mut HashMap<String, String>,
) -> Result<(), ConfigError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(());
    }
    let (key, value) = entry
        .split_once(':')
        .ok_or_else(|| ConfigError::MalformedHeader(entry.to_string()))?;
    headers.insert(key.trim().to_string(), value.trim().to_string());
    Ok(())
}
