use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tokio::sync::Mutex;

use crate::auth::{AuthError, AuthResult, Authenticator};
use crate::types::error::ErrorKind;
use crate::types::models::credentials::Credentials;

#[derive(thiserror::Error, Debug)]
pub enum CredentialError {
    #[error("Unable to access credentials file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Credentials file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Auth(#[from] AuthError),
}

impl CredentialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredentialError::Io(_) | CredentialError::Json(_) => ErrorKind::Storage,
            CredentialError::Auth(e) => e.kind(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LoginOutcome {
    LoggedIn(Credentials),
    Rejected { status: StatusCode, message: String },
}

/// Single-slot session record persisted as a JSON file.
///
/// File access is serialized through one lock, and writes go to a sibling
/// temp file that is renamed into place. The login handshake runs outside
/// the lock, so readers never wait on the auth server.
pub struct CredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> CredentialStore {
        CredentialStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Credentials>, CredentialError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Replaces whatever record exists.
    pub async fn save(&self, username: &str, token: &str) -> Result<Credentials, CredentialError> {
        let _guard = self.lock.lock().await;
        self.write(Credentials::new(username, token)).await
    }

    /// Removing an absent record is not an error.
    pub async fn del(&self) -> Result<(), CredentialError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                log::info!("Removed mod portal credentials");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => {
                log::error!("Failed to remove {}: {}", self.path.display(), e);
                Err(e.into())
            }
        }
    }

    /// A stored record counts as logged in; the token is never re-validated.
    pub async fn is_logged_in(&self) -> Result<bool, CredentialError> {
        Ok(self.load().await?.is_some())
    }

    pub async fn login<A: Authenticator>(
        &self,
        authenticator: &A,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, CredentialError> {
        match authenticator.authenticate(username, password).await? {
            AuthResult::Granted { username, token } => {
                let credentials = self.save(&username, &token).await?;
                log::info!("Logged into the mod portal as {}", credentials.username);
                Ok(LoginOutcome::LoggedIn(credentials))
            }
            AuthResult::Rejected { status, message } => {
                Ok(LoginOutcome::Rejected { status, message })
            }
        }
    }

    async fn read(&self) -> Result<Option<Credentials>, CredentialError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => {
                log::error!("Failed to read {}: {}", self.path.display(), e);
                return Err(e.into());
            }
        };

        Ok(Some(serde_json::from_slice(&contents)?))
    }

    async fn write(&self, credentials: Credentials) -> Result<Credentials, CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&credentials)?).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            log::error!("Failed to store credentials: {}", e);
            return Err(e.into());
        }

        Ok(credentials)
    }
}
