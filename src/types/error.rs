use reqwest::StatusCode;
use serde::Serialize;

/// Coarse classification every component error can be reduced to, so the
/// HTTP layer can pick a status code without knowing the concrete error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ErrorKind {
    MalformedInput,
    Upstream {
        #[serde(skip_serializing_if = "Option::is_none", with = "status_opt")]
        status: Option<StatusCode>,
    },
    TransientNetwork,
    Storage,
}

/// Bodies are decoded with serde after they are fully received, so a reqwest
/// error without a status is always a transport failure, including a body cut
/// off mid-stream.
pub fn classify_reqwest(e: &reqwest::Error) -> ErrorKind {
    match e.status() {
        Some(status) => ErrorKind::Upstream {
            status: Some(status),
        },
        None => ErrorKind::TransientNetwork,
    }
}

mod status_opt {
    use reqwest::StatusCode;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(status: &Option<StatusCode>, s: S) -> Result<S::Ok, S::Error> {
        match status {
            Some(status) => s.serialize_u16(status.as_u16()),
            None => s.serialize_none(),
        }
    }
}
