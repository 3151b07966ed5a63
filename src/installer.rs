use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::credentials::{CredentialError, CredentialStore};
use crate::mods::{DownloadError, DownloadManager};
use crate::portal::{ModPortal, ModPortalError};
use crate::types::error::ErrorKind;
use crate::types::models::credentials::Credentials;
use crate::types::models::installed_mod::InstalledMod;
use crate::types::version::Version;

#[derive(thiserror::Error, Debug)]
pub enum InstallError {
    #[error("Error in getting mod details from mod portal: {0}")]
    Portal(#[from] ModPortalError),
    #[error("Error downloading mod {name}: {source}")]
    Download {
        name: String,
        #[source]
        source: DownloadError,
    },
    #[error("Error listing installed mods: {0}")]
    Listing(DownloadError),
    #[error("{0}")]
    Credentials(#[from] CredentialError),
}

impl InstallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InstallError::Portal(e) => e.kind(),
            InstallError::Download { source, .. } => source.kind(),
            InstallError::Listing(e) => e.kind(),
            InstallError::Credentials(e) => e.kind(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InstallRequest {
    pub name: String,
    pub version: Version,
}

/// What a batch does once one of its items fails.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Stop at the first lookup or download failure. Earlier installs stay.
    #[default]
    FailFast,
    /// Record the failure and keep going.
    BestEffort,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Installed { file_name: String },
    Skipped { reason: SkipReason },
    Failed { error: String, kind: ErrorKind },
    NotAttempted,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoMatchingVersion { available: Vec<Version> },
}

#[derive(Serialize, Debug)]
pub struct BatchItem {
    pub name: String,
    pub version: Version,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

#[derive(Serialize, Debug)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub installed: Vec<InstalledMod>,
    /// Set when a fail-fast batch was aborted.
    #[serde(skip)]
    pub error: Option<InstallError>,
}

/// Resolves install requests against the portal and drives the downloads.
pub struct Installer<P> {
    portal: P,
    downloads: DownloadManager,
    credentials: Arc<CredentialStore>,
}

impl<P: ModPortal> Installer<P> {
    pub fn new(portal: P, downloads: DownloadManager, credentials: Arc<CredentialStore>) -> Self {
        Installer {
            portal,
            downloads,
            credentials,
        }
    }

    pub fn portal(&self) -> &P {
        &self.portal
    }

    pub async fn list_installed(&self) -> Result<Vec<InstalledMod>, InstallError> {
        self.downloads
            .list_installed_mods()
            .await
            .map_err(InstallError::Listing)
    }

    pub async fn install_one(
        &self,
        url: &str,
        file_name: &str,
        mod_name: &str,
    ) -> Result<Vec<InstalledMod>, InstallError> {
        let credentials = self.session().await;
        self.downloads
            .download_mod(url, file_name, mod_name, credentials.as_ref(), None)
            .await
            .map_err(|source| InstallError::Download {
                name: mod_name.to_string(),
                source,
            })?;

        self.list_installed().await
    }

    /// Installs `requests` one after another, in order.
    ///
    /// A request whose version has no release is skipped, not failed. The
    /// batch is not transactional: whatever was installed before an abort
    /// stays installed, and `installed` always reflects the directory after
    /// the last attempted item. `Err` is only returned if that final listing
    /// cannot be produced.
    pub async fn install_batch(
        &self,
        requests: Vec<InstallRequest>,
        policy: BatchPolicy,
    ) -> Result<BatchReport, InstallError> {
        let credentials = self.session().await;
        let mut items = Vec::with_capacity(requests.len());
        let mut error = None;

        for request in requests {
            if error.is_some() {
                items.push(BatchItem {
                    name: request.name,
                    version: request.version,
                    outcome: ItemOutcome::NotAttempted,
                });
                continue;
            }

            let outcome = match self.install_request(&request, credentials.as_ref()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("{}", e);
                    let failed = ItemOutcome::Failed {
                        error: e.to_string(),
                        kind: e.kind(),
                    };
                    if policy == BatchPolicy::FailFast {
                        error = Some(e);
                    }
                    failed
                }
            };

            items.push(BatchItem {
                name: request.name,
                version: request.version,
                outcome,
            });
        }

        let installed = self.list_installed().await?;
        Ok(BatchReport {
            items,
            installed,
            error,
        })
    }

    async fn install_request(
        &self,
        request: &InstallRequest,
        credentials: Option<&Credentials>,
    ) -> Result<ItemOutcome, InstallError> {
        let details = self.portal.details(&request.name).await?.data;

        let Some(release) = details.find_release(&request.version) else {
            log::warn!(
                "No release {} of {} on the mod portal, skipping",
                request.version,
                details.name
            );
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::NoMatchingVersion {
                    available: details.releases.iter().map(|r| r.version).collect(),
                },
            });
        };

        self.downloads
            .download_mod(
                &release.download_url,
                &release.file_name,
                &details.name,
                credentials,
                release.sha1.as_deref(),
            )
            .await
            .map_err(|source| InstallError::Download {
                name: details.name.clone(),
                source,
            })?;

        Ok(ItemOutcome::Installed {
            file_name: release.file_name.clone(),
        })
    }

    async fn session(&self) -> Option<Credentials> {
        match self.credentials.load().await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Ignoring unreadable mod portal session: {}", e);
                None
            }
        }
    }
}
