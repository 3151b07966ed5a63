use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ModPortal, ModPortalError, Portal};
use crate::types::models::portal::{ModDetails, ModList};

/// HTTP client for the mod portal API.
#[derive(Clone)]
pub struct PortalClient {
    req_client: Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(req_client: Client, base_url: Url) -> PortalClient {
        PortalClient {
            req_client,
            base_url,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ModPortalError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ModPortalError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn build(&self, method: Method, url: Url) -> RequestBuilder {
        self.req_client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Portal<T>, ModPortalError> {
        let response = self
            .build(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach mod portal at {}: {}", url, e);
                ModPortalError::Transient(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = upstream_message(response).await;
            log::warn!("Mod portal answered {} for {}: {}", status, url, message);
            return Err(ModPortalError::Upstream { status, message });
        }

        let body = response.bytes().await.map_err(|e| {
            log::error!("Mod portal response from {} was cut off: {}", url, e);
            ModPortalError::Transient(e)
        })?;
        let data = serde_json::from_slice::<T>(&body).map_err(|e| {
            log::error!("Failed to decode mod portal response from {}: {}", url, e);
            ModPortalError::Decode(e)
        })?;

        Ok(Portal { status, data })
    }
}

impl ModPortal for PortalClient {
    async fn list(&self) -> Result<Portal<ModList>, ModPortalError> {
        let mut url = self.endpoint(&["api", "mods"])?;
        url.query_pairs_mut().append_pair("page_size", "max");
        self.fetch(url).await
    }

    async fn details(&self, name: &str) -> Result<Portal<ModDetails>, ModPortalError> {
        let url = self.endpoint(&["api", "mods", name, "full"])?;
        self.fetch(url).await
    }
}

async fn upstream_message(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorType {
        message: String,
    }

    let status = response.status();
    match response.text().await {
        Ok(body) => match serde_json::from_str::<ErrorType>(&body) {
            Ok(e) => e.message,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        },
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}
