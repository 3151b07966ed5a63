use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

use crate::credentials::CredentialError;
use crate::installer::InstallError;
use crate::portal::ModPortalError;
use crate::types::error::ErrorKind;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub error: String,
    pub payload: T,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Upstream {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("{0}")]
    Portal(ModPortalError),
    #[error("{0}")]
    Install(#[from] InstallError),
    #[error("Error getting the mod portal credentials: {0}")]
    Credentials(#[from] CredentialError),
}

impl From<ModPortalError> for ApiError {
    fn from(e: ModPortalError) -> Self {
        match e {
            ModPortalError::Upstream { status, message } => ApiError::Upstream { status, message },
            other => ApiError::Portal(other),
        }
    }
}

/// actix and reqwest sit on different `http` versions.
pub fn to_actix_status(status: reqwest::StatusCode) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MalformedInput => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => to_actix_status(*status),
            ApiError::Portal(e) => status_for_kind(e.kind()),
            ApiError::Install(e) => status_for_kind(e.kind()),
            ApiError::Credentials(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        log::error!("{}", self);
        HttpResponse::build(self.status_code()).json(self.to_string())
    }
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!(
        "Error reading data from request {{{}}}: {}",
        req.uri(),
        err
    ))
    .into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(err.to_string()).into()
}
