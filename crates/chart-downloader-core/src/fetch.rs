//! Single-attempt artifact download
//!
//! The body is streamed into `<destination>.tmp` and only renamed to
//! `<destination>` once every byte has been written, so a file at the final
//! name is always complete.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{DownloadError, Result};
use crate::progress::{ObservedStream, ProgressObserver};

/// Suffix of the in-flight file
pub const TEMP_SUFFIX: &str = ".tmp";

/// Downloads one URL to one file
#[derive(Debug, Clone)]
pub struct FileFetcher {
    client: reqwest::Client,
}

impl FileFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download `url` to `destination`, reporting every chunk to `observer`.
    ///
    /// Returns the number of bytes written. On failure the temp file is left
    /// in place; the next attempt truncates it.
    pub async fn fetch<O>(&self, url: &str, destination: &Path, observer: O) -> Result<u64>
    where
        O: ProgressObserver + Unpin,
    {
        let tmp = temp_path(destination);
        let mut file = tokio::fs::File::create(&tmp).await?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                status: status.as_u16(),
                message: format!("Request to {} failed", url),
            });
        }

        let mut body = ObservedStream::new(Box::pin(response.bytes_stream()), observer);
        let copied = copy(&mut body, &mut file).await;
        body.observer_mut().finish();
        let written = copied?;

        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, destination).await?;
        Ok(written)
    }
}

async fn copy<S, B>(body: &mut S, file: &mut tokio::fs::File) -> Result<u64>
where
    S: futures::Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        file.write_all(chunk).await?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

/// `charts/foo.tgz` -> `charts/foo.tgz.tmp`
pub fn temp_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
