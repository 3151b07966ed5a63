use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
    /// When the record was written. Not an expiry.
    pub saved_at: DateTime<Utc>,
}

impl Credentials {
    pub fn new(username: &str, token: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            token: token.to_string(),
            saved_at: Utc::now(),
        }
    }
}
