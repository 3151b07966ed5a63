use reqwest::StatusCode;

use crate::types::error::{classify_reqwest, ErrorKind};

pub mod factorio;

pub use factorio::FactorioAuth;

/// Outcome of a credential handshake that reached the auth server.
#[derive(Debug, PartialEq)]
pub enum AuthResult {
    Granted { username: String, token: String },
    Rejected { status: StatusCode, message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Failed to reach the auth server: {0}")]
    Transient(reqwest::Error),
    #[error("Unable to decode auth server response: {0}")]
    Decode(serde_json::Error),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Transient(e) => classify_reqwest(e),
            AuthError::Decode(_) => ErrorKind::Upstream { status: None },
        }
    }
}

pub trait Authenticator {
    /// Exchanges a username and password for a session token.
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<AuthResult, AuthError>;
}
