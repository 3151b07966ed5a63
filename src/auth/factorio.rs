use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{AuthError, AuthResult, Authenticator};

const API_VERSION: &str = "4";

pub struct FactorioAuth {
    req_client: Client,
    login_url: Url,
}

impl FactorioAuth {
    pub fn new(req_client: Client, login_url: Url) -> FactorioAuth {
        FactorioAuth {
            req_client,
            login_url,
        }
    }
}

impl Authenticator for FactorioAuth {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResult, AuthError> {
        #[derive(Deserialize)]
        struct TokenResult {
            username: String,
            token: String,
        }

        #[derive(Deserialize)]
        struct ErrorType {
            message: String,
        }

        let response = self
            .req_client
            .post(self.login_url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(&[
                ("username", username),
                ("password", password),
                ("api_version", API_VERSION),
                ("require_game_ownership", "true"),
            ])
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach auth server: {}", e);
                AuthError::Transient(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorType>().await {
                Ok(e) => e.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Login failed")
                    .to_string(),
            };
            log::info!("Login for {} rejected with {}: {}", username, status, message);
            return Ok(AuthResult::Rejected { status, message });
        }

        let body = response.bytes().await.map_err(|e| {
            log::error!("Auth server response was cut off: {}", e);
            AuthError::Transient(e)
        })?;
        let body = serde_json::from_slice::<TokenResult>(&body).map_err(|e| {
            log::error!("{}", e);
            AuthError::Decode(e)
        })?;

        Ok(AuthResult::Granted {
            username: body.username,
            token: body.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn auth_for(server: &MockServer) -> FactorioAuth {
        let url = Url::parse(&format!("{}/api-login", server.uri())).unwrap();
        FactorioAuth::new(Client::new(), url)
    }

    #[tokio::test]
    async fn grants_a_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-login"))
            .and(body_string_contains("username=engineer"))
            .and(body_string_contains("require_game_ownership=true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"username": "engineer", "token": "t0k3n"})),
            )
            .mount(&server)
            .await;

        let result = auth_for(&server)
            .await
            .authenticate("engineer", "hunter2")
            .await
            .unwrap();
        assert_eq!(
            result,
            AuthResult::Granted {
                username: "engineer".into(),
                token: "t0k3n".into()
            }
        );
    }

    #[tokio::test]
    async fn rejection_keeps_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({"error": "login-failed", "message": "Username or password wrong"}),
            ))
            .mount(&server)
            .await;

        let result = auth_for(&server)
            .await
            .authenticate("engineer", "wrong")
            .await
            .unwrap();
        assert_eq!(
            result,
            AuthResult::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message: "Username or password wrong".into()
            }
        );
    }
}
