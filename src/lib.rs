//! Wisp: a link crawler that renders pages in a headless browser
//!
//! This crate implements a depth-bounded crawler that loads pages through
//! headless Chrome (so JavaScript-generated links are captured), follows
//! discovered links according to independent collect and follow filters,
//! and optionally downloads matched resources under configurable file names.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod download;
pub mod permute;

use thiserror::Error;

/// Main error type for wisp operations
#[derive(Debug, Error)]
pub enum WispError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser session error: {0}")]
    Session(#[from] SessionError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Regex '{name}' could not be compiled: {source}")]
    InvalidRegex {
        name: &'static str,
        source: regex::Error,
    },

    #[error("Could not parse header '{0}': missing key value separator ':'")]
    MalformedHeader(String),

    #[error("Could not read file '{0}'")]
    FileRef(String),
}

/// Errors raised by the browser page session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser or its CDP connection was torn down mid-fetch.
    /// Eligible for reconnect-and-retry.
    #[error("Browser session disconnected: {0}")]
    Disconnected(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Timeout while loading DOM content for {url}")]
    Timeout { url: String },

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Script evaluation failed for {url}: {message}")]
    Evaluation { url: String, message: String },
}

impl SessionError {
    /// Transient errors are retried with a session reconnect in between;
    /// everything else counts as "zero links found" for the URL.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }
}

/// Download-specific errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Naming capture does not match URL '{url}'")]
    NoNamingMatch { url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for wisp operations
pub type Result<T> = std::result::Result<T, WispError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{BrowserSession, PageSession, RaceCell};
pub use config::Config;
pub use crawler::{LinkSet, VisitedTracker};
pub use permute::expand;
