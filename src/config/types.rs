use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Matches every link.
pub const MATCH_ALL: &str = ".*";

/// Matches no link.
pub const MATCH_NOTHING: &str = "$^";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.183 Safari/537.36";

/// Default capture regex deriving download file names from URLs.
pub const DEFAULT_NAMING_CAPTURE: &str =
    r"^http(s|)://(?P<path>.*)/(?P<name>\w+)(\.|)(?P<ext>(\.\w+)|)$";

/// Default pattern the naming captures substitute into.
pub const DEFAULT_NAMING_PATTERN: &str = "<path>/<name><ext>";

/// Raw configuration as read from a TOML file or assembled from CLI flags.
///
/// Everything is still in string form here; [`crate::config::compile`]
/// turns it into the read-only [`Config`] the core consumes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Seed URL pattern, or `@path` to a file with one pattern per line.
    /// Patterns may contain permutation tokens like `[1-100]` or `[a,b,c]`.
    pub url: Option<String>,

    /// Maximum number of follow hops from a seed.
    #[serde(default)]
    pub depth: u32,

    /// Page load timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout: u64,

    /// Additional wait after the load event, in milliseconds.
    #[serde(rename = "extra-waittime", default)]
    pub extra_waittime: u64,

    /// Header entries in `Key: Value` form, or `@path` file references.
    #[serde(default)]
    pub headers: Vec<String>,

    /// Basic auth credentials in `user:password` form.
    #[serde(default)]
    pub auth: Option<String>,

    /// User agent override; the literal `none` leaves the browser's own.
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// Collect filter: regex of links kept in the result.
    #[serde(default = "default_match_all")]
    pub include: String,

    /// Collect filter: regex of links dropped from the result.
    #[serde(default = "default_match_nothing")]
    pub exclude: String,

    /// Follow filter: regex of links eligible for expansion.
    #[serde(rename = "follow-include", default = "default_match_all")]
    pub follow_include: String,

    /// Follow filter: regex of links never expanded.
    #[serde(rename = "follow-exclude", default = "default_match_nothing")]
    pub follow_exclude: String,

    /// Download each collected link instead of listing it.
    #[serde(default)]
    pub download: bool,

    /// Regex with named groups capturing file name parts from a URL.
    #[serde(rename = "naming-capture", default = "default_naming_capture")]
    pub naming_capture: String,

    /// Treat `/` inside capture groups as subfolders instead of `_`.
    #[serde(rename = "naming-capture-folders", default)]
    pub naming_capture_folders: bool,

    /// Output path template; `<group>` references a naming capture group.
    #[serde(rename = "naming-pattern", default = "default_naming_pattern")]
    pub naming_pattern: String,

    /// Reconnect attempts after a transient session loss.
    #[serde(rename = "reconnect-attempts", default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Skip downloads whose destination file already exists.
    #[serde(rename = "skip-existing", default)]
    pub skip_existing: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            url: None,
            depth: 0,
            timeout: default_timeout_ms(),
            extra_waittime: 0,
            headers: Vec::new(),
            auth: None,
            user_agent: None,
            include: default_match_all(),
            exclude: default_match_nothing(),
            follow_include: default_match_all(),
            follow_exclude: default_match_nothing(),
            download: false,
            naming_capture: default_naming_capture(),
            naming_capture_folders: false,
            naming_pattern: default_naming_pattern(),
            reconnect_attempts: default_reconnect_attempts(),
            skip_existing: false,
        }
    }
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_match_all() -> String {
    MATCH_ALL.to_string()
}

fn default_match_nothing() -> String {
    MATCH_NOTHING.to_string()
}

fn default_naming_capture() -> String {
    DEFAULT_NAMING_CAPTURE.to_string()
}

fn default_naming_pattern() -> String {
    DEFAULT_NAMING_PATTERN.to_string()
}

fn default_reconnect_attempts() -> u32 {
    5
}

/// Compiled, read-only configuration the core consumes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Concrete seed URLs after permutation expansion.
    pub seeds: Vec<String>,
    pub max_depth: u32,
    pub timeout: Duration,
    pub extra_wait: Duration,
    /// Normalized string-keyed header map; key case handling belongs to
    /// the browser/HTTP collaborators.
    pub headers: HashMap<String, String>,
    pub include: Regex,
    pub exclude: Regex,
    pub follow_include: Regex,
    pub follow_exclude: Regex,
    pub download: bool,
    pub naming_capture: Regex,
    pub naming_capture_folders: bool,
    pub naming_pattern: String,
    pub reconnect_attempts: u32,
    pub skip_existing: bool,
}
