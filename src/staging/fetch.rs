use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Url;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info};

use super::{FetchError, MediaKind, StagedResource};
use crate::config::StagingConfig;

/// Write buffer size for streamed downloads.
const CHUNK_SIZE: usize = 8 * 1024;

/// Whether `source` should be downloaded rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Resolves paths and URLs into [`StagedResource`]s.
///
/// Download timeouts bound the connect and each gap between reads, not the
/// whole transfer, so a large file that keeps flowing is never cut off.
pub struct Fetcher {
    client: reqwest::Client,
    video_client: reqwest::Client,
    temp_dir: PathBuf,
}

impl Fetcher {
    pub fn new(config: StagingConfig) -> Result<Self> {
        Ok(Self {
            client: download_client(config.timeout_for(MediaKind::File))?,
            video_client: download_client(config.timeout_for(MediaKind::Video))?,
            temp_dir: config.effective_temp_dir(),
        })
    }

    fn client_for(&self, kind: MediaKind) -> &reqwest::Client {
        match kind {
            MediaKind::Video => &self.video_client,
            MediaKind::Image | MediaKind::File => &self.client,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub async fn fetch(&self, source: &str, kind: MediaKind) -> Result<StagedResource, FetchError> {
        if !is_remote(source) {
            debug!("Using local {} path: {}", kind, source);
            return Ok(StagedResource::local(source, kind));
        }

        info!("Detected URL, downloading {}: {}", kind, source);
        match self.download(source, kind).await {
            Ok(staged) => {
                info!(
                    "{} downloaded to temporary file: {}",
                    kind,
                    staged.local_path().display()
                );
                Ok(staged)
            }
            Err(e) => {
                error!("Failed to download {} from {}: {:#}", kind, source, e);
                Err(FetchError::DownloadFailed {
                    kind,
                    reason: format!("{e:#}"),
                })
            }
        }
    }

    async fn download(&self, source: &str, kind: MediaKind) -> Result<StagedResource> {
        let url = Url::parse(source).context("Invalid URL")?;

        let response = self
            .client_for(kind)
            .get(url.clone())
            .send()
            .await
            .context("Request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status);
        }

        let (file, staged) = self.create_destination(source, &url, kind).await?;
        // On error `staged` is dropped here, which removes the partial file.
        let written = write_body(response, file).await?;
        debug!("Wrote {} bytes to {}", written, staged.local_path().display());

        Ok(staged)
    }

    async fn create_destination(
        &self,
        source: &str,
        url: &Url,
        kind: MediaKind,
    ) -> Result<(tokio::fs::File, StagedResource)> {
        match kind.default_extension() {
            Some(default_ext) => {
                let ext = url_extension(url).unwrap_or(default_ext);
                let suffix = format!(".{ext}");
                let temp = tempfile::Builder::new()
                    .prefix("wxgate-")
                    .suffix(&suffix)
                    .tempfile_in(&self.temp_dir)
                    .with_context(|| {
                        format!("Failed to create temp file in {}", self.temp_dir.display())
                    })?;
                let (file, path) = temp.keep().context("Failed to persist temp file")?;
                let staged = StagedResource::temporary(source, path, kind);
                Ok((tokio::fs::File::from_std(file), staged))
            }
            None => {
                // Keep the original name, the recipient sees it.
                let name = url_basename(url)
                    .unwrap_or_else(|| format!("file_{}", uuid::Uuid::new_v4().simple()));
                let path = self.temp_dir.join(name);
                let file = tokio::fs::File::create(&path)
                    .await
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                Ok((file, StagedResource::temporary(source, path, kind)))
            }
        }
    }
}

fn download_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
        .context("Failed to build download client")
}

async fn write_body(response: reqwest::Response, file: tokio::fs::File) -> Result<u64> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("reading chunk")?;
        writer.write_all(&chunk).await.context("writing chunk")?;
        written += chunk.len() as u64;
    }

    writer.flush().await.context("flushing file")?;
    Ok(written)
}

/// Extension of the URL path's last segment, if it looks like one.
fn url_extension(url: &Url) -> Option<&str> {
    Path::new(url.path())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn url_basename(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}
