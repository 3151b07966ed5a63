use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use reqwest::{Client, StatusCode, Url};
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;

use super::scan;
use crate::types::error::{classify_reqwest, ErrorKind};
use crate::types::models::credentials::Credentials;
use crate::types::models::installed_mod::InstalledMod;

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("Invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("Invalid download url '{0}'")]
    InvalidUrl(String),
    #[error("Failed to download file: {0}")]
    Transient(reqwest::Error),
    #[error("Download interrupted: {0}")]
    Interrupted(reqwest::Error),
    #[error("Download server responded with {0}")]
    Upstream(StatusCode),
    #[error("File size is too large, max {0}MB")]
    TooLarge(u32),
    #[error("Hash mismatch for {file_name}: expected {expected}, got {actual}")]
    HashMismatch {
        file_name: String,
        expected: String,
        actual: String,
    },
    #[error("Filesystem error: {0}")]
    Storage(#[from] std::io::Error),
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::InvalidFileName(_) | DownloadError::InvalidUrl(_) => {
                ErrorKind::MalformedInput
            }
            DownloadError::Transient(e) => classify_reqwest(e),
            DownloadError::Interrupted(_) => ErrorKind::TransientNetwork,
            DownloadError::Upstream(status) => ErrorKind::Upstream {
                status: Some(*status),
            },
            DownloadError::TooLarge(_) | DownloadError::HashMismatch { .. } => {
                ErrorKind::Upstream { status: None }
            }
            DownloadError::Storage(_) => ErrorKind::Storage,
        }
    }
}

pub struct DownloadOptions {
    pub max_download_mb: Option<u32>,
    pub verify_hashes: bool,
}

/// Moves release archives into the mods directory.
///
/// Each transfer is streamed into a hidden temp file next to the target and
/// renamed over it once complete, so a failed download never clobbers an
/// existing archive. Transfers targeting the same file name run one at a time.
pub struct DownloadManager {
    req_client: Client,
    mods_dir: PathBuf,
    portal_url: Url,
    options: DownloadOptions,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DownloadManager {
    pub fn new(
        req_client: Client,
        mods_dir: impl Into<PathBuf>,
        portal_url: Url,
        options: DownloadOptions,
    ) -> DownloadManager {
        DownloadManager {
            req_client,
            mods_dir: mods_dir.into(),
            portal_url,
            options,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Downloads `url` into `<mods_dir>/<file_name>`, replacing any file of that name.
    ///
    /// Relative urls are resolved against the mod portal and, when a session
    /// exists, carry its username and token.
    pub async fn download_mod(
        &self,
        url: &str,
        file_name: &str,
        mod_name: &str,
        credentials: Option<&Credentials>,
        expected_sha1: Option<&str>,
    ) -> Result<PathBuf, DownloadError> {
        validate_file_name(file_name)?;
        let resolved = self.resolve(url, credentials)?;
        let target = self.mods_dir.join(file_name);

        let lock = self.lock_for(file_name);
        let guard = lock.lock().await;
        let result = self
            .transfer(resolved, &target, file_name, expected_sha1)
            .await;
        drop(guard);
        self.release_lock(file_name, lock);

        match &result {
            Ok(_) => log::info!("Installed {} as {}", mod_name, target.display()),
            Err(e) => log::error!("Failed to download {} ({}): {}", mod_name, url, e),
        }
        result.map(|_| target)
    }

    pub async fn list_installed_mods(&self) -> Result<Vec<InstalledMod>, DownloadError> {
        let dir = self.mods_dir.clone();
        let listing = tokio::task::spawn_blocking(move || scan::scan_dir(&dir))
            .await
            .map_err(std::io::Error::other)??;
        Ok(listing)
    }

    fn resolve(&self, url: &str, credentials: Option<&Credentials>) -> Result<Url, DownloadError> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }

        let mut resolved = self
            .portal_url
            .join(url)
            .map_err(|_| DownloadError::InvalidUrl(url.to_string()))?;
        if let Some(c) = credentials {
            resolved
                .query_pairs_mut()
                .append_pair("username", &c.username)
                .append_pair("token", &c.token);
        }
        Ok(resolved)
    }

    async fn transfer(
        &self,
        url: Url,
        target: &Path,
        file_name: &str,
        expected_sha1: Option<&str>,
    ) -> Result<(), DownloadError> {
        tokio::fs::create_dir_all(&self.mods_dir).await?;

        let response = self
            .req_client
            .get(url)
            .send()
            .await
            .map_err(DownloadError::Transient)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Upstream(status));
        }

        let limit_bytes = self.options.max_download_mb.map(|mb| mb as u64 * 1_000_000);
        if let (Some(limit), Some(len)) = (limit_bytes, response.content_length()) {
            if len > limit {
                return Err(DownloadError::TooLarge(self.options.max_download_mb.unwrap_or(0)));
            }
        }

        let tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(&self.mods_dir)?;
        let mut file = tokio::fs::File::from_std(tmp.reopen()?);
        let mut hasher = Sha1::new();
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(DownloadError::Interrupted)?;
            written += chunk.len() as u64;
            if limit_bytes.is_some_and(|limit| written > limit) {
                return Err(DownloadError::TooLarge(self.options.max_download_mb.unwrap_or(0)));
            }
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        if self.options.verify_hashes {
            if let Some(expected) = expected_sha1 {
                let actual = format!("{:x}", hasher.finalize());
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(DownloadError::HashMismatch {
                        file_name: file_name.to_string(),
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }
        }

        tmp.persist(target).map_err(|e| DownloadError::Storage(e.error))?;
        Ok(())
    }

    fn lock_for(&self, file_name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(file_name.to_string()).or_default().clone()
    }

    fn release_lock(&self, file_name: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // one reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(file_name);
        }
    }
}

fn validate_file_name(file_name: &str) -> Result<(), DownloadError> {
    let invalid = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(DownloadError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}
