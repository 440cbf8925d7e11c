//! HTTP download of media files for the ingestion endpoint.
//!
//! Files are streamed chunk by chunk to disk. The extension comes from the
//! response `Content-Type`, then from the URL path, then defaults to `bin`.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::{header, Client, Url};
use tokio::io::AsyncWriteExt;

use crate::error::{CoreError, CoreResult};

/// Extension used when neither the content type nor the URL names one.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Maps a MIME type essence (no parameters, lowercase) to a file extension.
pub fn extension_for_mime(essence: &str) -> Option<&'static str> {
    let ext = match essence {
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/x-msvideo" => "avi",
        "video/x-m4v" => "m4v",
        "video/mpeg" => "mpeg",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "audio/mpeg" => "mp3",
        "audio/mp4" => "m4a",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        _ => return None,
    };
    Some(ext)
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// Picks the file extension for a response.
pub fn choose_extension(content_type: Option<&str>, url: &Url) -> String {
    content_type
        .map(mime_essence)
        .and_then(|essence| extension_for_mime(&essence))
        .map(str::to_string)
        .or_else(|| extension_from_url(url))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Downloads `url` to `<dir>/<stem>.<ext>` and returns the written path.
///
/// Non-2xx responses are errors. `dir` is created if missing.
pub async fn download_file(client: &Client, url: &str, dir: &Path, stem: &str) -> CoreResult<PathBuf> {
    let parsed = Url::parse(url).map_err(|e| CoreError::Download(format!("invalid URL '{url}': {e}")))?;
    tokio::fs::create_dir_all(dir).await?;

    let mut response = client.get(parsed.clone()).send().await?.error_for_status()?;
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let extension = choose_extension(content_type, &parsed);
    let path = dir.join(format!("{stem}.{extension}"));

    let mut file = tokio::fs::File::create(&path).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!("Downloaded {url} ({written} bytes) to {}", path.display());
    Ok(path)
}

/// Downloads every URL into `dir`, at most `concurrency` at a time (0 means
/// no limit).
///
/// Each file is named `media-<batch timestamp ms>-<position>` with positions
/// starting at 1. The returned results line up with `urls`; one failed
/// download does not affect the others.
pub async fn download_all(
    client: &Client,
    urls: &[String],
    dir: &Path,
    concurrency: usize,
) -> CoreResult<Vec<CoreResult<PathBuf>>> {
    tokio::fs::create_dir_all(dir).await?;
    let batch = chrono::Utc::now().timestamp_millis();
    let limit = if concurrency == 0 { urls.len().max(1) } else { concurrency };

    // Items must be owned: borrowed URLs make the batch future unusable
    // inside `tokio::spawn`.
    let mut results: Vec<(usize, CoreResult<PathBuf>)> = stream::iter(urls.iter().cloned().enumerate())
        .map(|(index, url)| async move {
            let stem = format!("media-{batch}-{}", index + 1);
            let result = download_file(client, &url, dir, &stem).await;
            if let Err(e) = &result {
                warn!("Download of {url} failed: {e}");
            }
            (index, result)
        })
        .buffer_unordered(limit)
        .collect()
        .await;
    results.sort_by_key(|(index, _)| *index);

    let ok = results.iter().filter(|(_, r)| r.is_ok()).count();
    info!("Downloaded {ok} of {} file(s) into {}", urls.len(), dir.display());
    Ok(results.into_iter().map(|(_, result)| result).collect())
}
