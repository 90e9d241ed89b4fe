//! Streaming HTTP download of resolved URLs

use crate::config::Config;
use crate::DownloadError;
use futures::StreamExt;
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Builds the HTTP client used for downloads, sharing the crawl's
/// per-request timeout.
pub fn build_download_client(config: &Config) -> Result<Client, DownloadError> {
    let client = Client::builder()
        .timeout(config.timeout)
        .gzip(true)
        .brotli(true)
        .build()?;
    Ok(client)
}

/// Streams `url` to the file at `dest`, creating parent directories first.
pub async fn download_file(
    client: &Client,
    url: &str,
    dest: &str,
    headers: &HashMap<String, String>,
) -> Result<(), DownloadError> {
    let mut request = client.get(url);
    for (key, value) in headers {
        request = request.header(key.as_str(), value.as_str());
    }
    let response = request.send().await?.error_for_status()?;

    if let Some(parent) = Path::new(dest).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}
