use reqwest::StatusCode;

use crate::types::error::{classify_reqwest, ErrorKind};
use crate::types::models::portal::{ModDetails, ModList};

pub mod client;

pub use client::PortalClient;

/// A decoded portal response together with the status the portal answered with.
#[derive(Debug)]
pub struct Portal<T> {
    pub status: StatusCode,
    pub data: T,
}

#[derive(thiserror::Error, Debug)]
pub enum ModPortalError {
    #[error("Mod portal responded with {status}: {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("Failed to reach the mod portal: {0}")]
    Transient(reqwest::Error),
    #[error("Unable to decode mod portal response: {0}")]
    Decode(serde_json::Error),
    #[error("Invalid mod portal url: {0}")]
    InvalidUrl(String),
}

impl ModPortalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModPortalError::Upstream { status, .. } => ErrorKind::Upstream {
                status: Some(*status),
            },
            ModPortalError::Transient(e) => classify_reqwest(e),
            ModPortalError::Decode(_) => ErrorKind::Upstream { status: None },
            ModPortalError::InvalidUrl(_) => ErrorKind::MalformedInput,
        }
    }
}

/// Read-only view of the remote mod repository.
pub trait ModPortal {
    async fn list(&self) -> Result<Portal<ModList>, ModPortalError>;

    /// Name, metadata and the full release list of one mod.
    async fn details(&self, name: &str) -> Result<Portal<ModDetails>, ModPortalError>;
}
