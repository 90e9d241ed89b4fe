//! Download mode: naming resolution and HTTP fetching
//!
//! Each collected URL runs through the naming resolver; mismatches and
//! per-URL transport errors are logged and skipped, never fatal.

mod fetch;
mod naming;

pub use fetch::{build_download_client, download_file};
pub use naming::resolve_name;

use crate::config::Config;
use crate::DownloadError;
use std::path::Path;

/// Downloads every link to its resolved destination path.
///
/// Returns the number of files actually written. Only a failure to build
/// the HTTP client at all is an error; everything per-URL is logged and
/// skipped.
pub async fn download_all(config: &Config, links: &[String]) -> Result<usize, DownloadError> {
    let client = build_download_client(config)?;
    let mut downloaded = 0;

    for url in links {
        let dest = match resolve_name(
            url,
            &config.naming_capture,
            &config.naming_pattern,
            config.naming_capture_folders,
        ) {
            Ok(dest) => dest,
            Err(e) => {
                tracing::error!("Cannot download: {}", e);
                continue;
            }
        };

        if config.skip_existing && Path::new(&dest).exists() {
            tracing::info!(
                "Skipping download from '{}' as local file '{}' already exists",
                url,
                dest
            );
            continue;
        }

        match download_file(&client, url, &dest, &config.headers).await {
            Ok(()) => {
                tracing::info!("Downloaded '{}' to '{}'", url, dest);
                downloaded += 1;
            }
            Err(e) => {
                tracing::error!("Download failed for '{}': {}", url, e);
            }
        }
    }

    Ok(downloaded)
}
