//! Download-if-missing for datasets and artifacts hosted remotely

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::RemoteFile;
use crate::error::{PhishError, Result};

const DRIVE_DOWNLOAD_BASE: &str = "https://drive.google.com/uc?id=";

/// What `fetch_if_missing` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination existed; nothing was requested
    AlreadyPresent,
    /// Downloaded this many bytes
    Downloaded(u64),
}

/// Direct-download URL for a Google Drive file id
pub fn drive_download_url(file_id: &str) -> String {
    format!("{}{}", DRIVE_DOWNLOAD_BASE, file_id)
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// The body is written to a sibling `.part` file and renamed into place, so
/// an interrupted download never leaves a truncated `dest` behind.
pub async fn fetch_if_missing(client: &reqwest::Client, url: &str, dest: &Path) -> Result<FetchOutcome> {
    if tokio::fs::try_exists(dest).await? {
        debug!("{} already present, skipping download", dest.display());
        return Ok(FetchOutcome::AlreadyPresent);
    }

    info!("Downloading {} to {}", url, dest.display());
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PhishError::Fetch(format!("request to {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(PhishError::Fetch(format!(
            "{} returned status {}",
            url,
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| PhishError::Fetch(format!("failed to read body from {}: {}", url, e)))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = partial_path(dest);
    tokio::fs::write(&partial, &body).await?;
    if let Err(e) = tokio::fs::rename(&partial, dest).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }

    info!("Downloaded {} bytes to {}", body.len(), dest.display());
    Ok(FetchOutcome::Downloaded(body.len() as u64))
}

/// Fetch every configured file, logging failures instead of returning them.
///
/// Returns the number of files that are present afterwards.
pub async fn fetch_all(client: &reqwest::Client, files: &[RemoteFile]) -> usize {
    let mut present = 0;
    for file in files {
        let result = match file.source_url() {
            Ok(url) => fetch_if_missing(client, &url, &file.destination).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => present += 1,
            Err(e) => warn!("Could not fetch {}: {}", file.destination.display(), e),
        }
    }
    present
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves one canned HTTP response and returns its URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}/file", addr)
    }

    #[test]
    fn test_drive_url() {
        assert_eq!(
            drive_download_url("1AbC"),
            "https://drive.google.com/uc?id=1AbC"
        );
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("dir/model.bin")),
            PathBuf::from("dir/model.bin.part")
        );
    }

    #[tokio::test]
    async fn test_existing_file_skips_network() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("data.csv");
        std::fs::write(&dest, "text_combined,label\n").unwrap();

        // Port 9 on localhost is never queried because the file exists
        let outcome = fetch_if_missing(&reqwest::Client::new(), "http://127.0.0.1:9/x", &dest)
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "text_combined,label\n");
    }

    #[tokio::test]
    async fn test_downloads_missing_file() {
        let url = serve_once("200 OK", "hello").await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("sub").join("data.csv");

        let outcome = fetch_if_missing(&reqwest::Client::new(), &url, &dest)
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Downloaded(5));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_error_status_leaves_nothing() {
        let url = serve_once("404 Not Found", "missing").await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("data.csv");

        let err = fetch_if_missing(&reqwest::Client::new(), &url, &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, PhishError::Fetch(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_all_counts_present_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("a.csv");
        std::fs::write(&present, "x").unwrap();

        let files = vec![
            RemoteFile {
                file_id: None,
                url: Some("http://127.0.0.1:9/a".to_string()),
                destination: present,
            },
            RemoteFile {
                file_id: None,
                url: None,
                destination: dir.path().join("b.csv"),
            },
        ];
        assert_eq!(fetch_all(&reqwest::Client::new(), &files).await, 1);
    }
}
