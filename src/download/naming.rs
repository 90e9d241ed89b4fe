//! Download file-name resolution
//!
//! A naming-capture regex with named groups is applied to the URL; each
//! captured group is sanitized and substituted into the naming pattern at
//! its `<name>` placeholder.

use crate::DownloadError;
use regex::Regex;

/// Resolves the destination file path for a URL.
///
/// Fails with [`DownloadError::NoNamingMatch`] when the capture regex does
/// not match; no filesystem action is taken in that case. Unnamed groups
/// are ignored; a named group that did not participate in the match
/// substitutes an empty string.
pub fn resolve_name(
    url: &str,
    capture: &Regex,
    pattern: &str,
    capture_folders: bool,
) -> Result<String, DownloadError> {
    let caps = capture
        .captures(url)
        .ok_or_else(|| DownloadError::NoNamingMatch {
            url: url.to_string(),
        })?;

    let mut resolved = pattern.to_string();
    for name in capture.capture_names().flatten() {
        let text = caps.name(name).map(|m| m.as_str()).unwrap_or("");
        let replacement = sanitize_path(text, !capture_folders);
        resolved = resolved.replace(&format!("<{}>", name), &replacement);
    }
    Ok(resolved)
}

/// Replaces characters illegal in file paths with `_`. When `replace_sep`
/// is set, path separators are replaced too, flattening the capture into a
/// single path component.
fn sanitize_path(input: &str, replace_sep: bool) -> String {
    input
        .chars()
        .map(|c| match c {
            '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' | ',' | ';' | '=' => '_',
            '/' | '\\' if replace_sep => '_',
            c => c,
        })
        .collect()
}
