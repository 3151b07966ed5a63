use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::config::AppData;
use crate::credentials::LoginOutcome;
use crate::installer::{BatchPolicy, InstallRequest};
use crate::portal::ModPortal;
use crate::types::api::{to_actix_status, ApiError, ApiResponse};

#[derive(Deserialize)]
struct ModPath {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstallPayload {
    link: String,
    filename: String,
    mod_name: String,
}

#[derive(Deserialize)]
struct BatchQuery {
    #[serde(default)]
    policy: BatchPolicy,
}

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[get("/api/mods/portal/list")]
pub async fn list(data: web::Data<AppData>) -> Result<impl Responder, ApiError> {
    let result = data.installer().portal().list().await?;
    Ok(HttpResponse::build(to_actix_status(result.status)).json(result.data))
}

#[get("/api/mods/portal/info/{name}")]
pub async fn info(
    path: web::Path<ModPath>,
    data: web::Data<AppData>,
) -> Result<impl Responder, ApiError> {
    let result = data.installer().portal().details(&path.name).await?;
    Ok(HttpResponse::build(to_actix_status(result.status)).json(result.data))
}

#[post("/api/mods/portal/install")]
pub async fn install(
    data: web::Data<AppData>,
    payload: web::Json<InstallPayload>,
) -> Result<impl Responder, ApiError> {
    let listing = data
        .installer()
        .install_one(&payload.link, &payload.filename, &payload.mod_name)
        .await?;
    Ok(web::Json(listing))
}

#[post("/api/mods/portal/install/multiple")]
pub async fn install_multiple(
    data: web::Data<AppData>,
    query: web::Query<BatchQuery>,
    payload: web::Json<Vec<InstallRequest>>,
) -> Result<impl Responder, ApiError> {
    let report = data
        .installer()
        .install_batch(payload.into_inner(), query.policy)
        .await?;

    let (status, error) = match &report.error {
        Some(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        None => (StatusCode::OK, "".to_string()),
    };
    Ok(HttpResponse::build(status).json(ApiResponse {
        error,
        payload: report,
    }))
}

#[post("/api/mods/portal/login")]
pub async fn login(
    data: web::Data<AppData>,
    payload: web::Json<LoginPayload>,
) -> Result<impl Responder, ApiError> {
    let outcome = data
        .credentials()
        .login(data.auth(), &payload.username, &payload.password)
        .await?;

    match outcome {
        LoginOutcome::LoggedIn(_) => Ok(HttpResponse::Ok().json(true)),
        LoginOutcome::Rejected { status, message } => {
            Ok(HttpResponse::build(to_actix_status(status)).json(message))
        }
    }
}

#[get("/api/mods/portal/loginstatus")]
pub async fn login_status(data: web::Data<AppData>) -> Result<impl Responder, ApiError> {
    Ok(web::Json(data.credentials().is_logged_in().await?))
}

#[post("/api/mods/portal/logout")]
pub async fn logout(data: web::Data<AppData>) -> Result<impl Responder, ApiError> {
    data.credentials().del().await?;
    Ok(web::Json(false))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use actix_web::{test, App};
    use reqwest::Url;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{build_config, Settings};

    fn app_data(dir: &Path, server: &MockServer) -> AppData {
        let settings = Settings {
            port: 0,
            debug: false,
            mods_dir: dir.join("mods"),
            credentials_path: dir.join("credentials.json"),
            portal_url: Url::parse(&server.uri()).unwrap(),
            auth_url: Url::parse(&format!("{}/api-login", server.uri())).unwrap(),
            request_timeout: Duration::from_secs(5),
            max_download_mb: None,
            verify_downloads: false,
        };
        build_config(&settings).unwrap()
    }

    macro_rules! service {
        ($data:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($data))
                    .configure(crate::endpoints::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn passes_upstream_status_through() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mods/unknownmod/full"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Mod not found"})),
            )
            .mount(&server)
            .await;
        let app = service!(app_data(dir.path(), &server));

        let req = test::TestRequest::get()
            .uri("/api/mods/portal/info/unknownmod")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: String = test::read_body_json(resp).await;
        assert_eq!(body, "Mod not found");
    }

    #[actix_web::test]
    async fn info_relays_portal_fields() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let upstream = json!({
            "name": "belts",
            "description": "Faster belts",
            "changelog": "1.1.0: initial",
            "thumbnail": "/assets/belts.png",
            "category": "logistics",
            "releases": [{
                "version": "1.1.0",
                "download_url": "/download/belts/a",
                "file_name": "belts_1.1.0.zip",
                "info_json": {"factorio_version": "1.1", "dependencies": ["base >= 1.1"]}
            }]
        });
        Mock::given(method("GET"))
            .and(path("/api/mods/belts/full"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .mount(&server)
            .await;
        let app = service!(app_data(dir.path(), &server));

        let req = test::TestRequest::get()
            .uri("/api/mods/portal/info/belts")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, upstream);
    }

    #[actix_web::test]
    async fn install_returns_listing() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/x.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
            .mount(&server)
            .await;
        let app = service!(app_data(dir.path(), &server));

        let req = test::TestRequest::post()
            .uri("/api/mods/portal/install")
            .set_json(json!({
                "link": format!("{}/x.zip", server.uri()),
                "filename": "x_1.0.0.zip",
                "modName": "x"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Vec<Value> = test::read_body_json(resp).await;
        assert_eq!(body[0]["name"], "x");
        assert_eq!(body[0]["version"], "1.0.0");
    }

    #[actix_web::test]
    async fn malformed_bodies_are_bad_requests() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let app = service!(app_data(dir.path(), &server));

        let req = test::TestRequest::post()
            .uri("/api/mods/portal/install/multiple")
            .set_json(json!([{"name": "belts", "version": "one.two"}]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/mods/portal/install")
            .set_json(json!({"link": "http://localhost/x.zip"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn aborted_batch_reports_items() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mods/unknownmod/full"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let app = service!(app_data(dir.path(), &server));

        let req = test::TestRequest::post()
            .uri("/api/mods/portal/install/multiple")
            .set_json(json!([
                {"name": "unknownmod", "version": "1.0.0"},
                {"name": "later", "version": "1.0.0"}
            ]))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("404"));
        assert_eq!(body["payload"]["items"][0]["status"], "failed");
        assert_eq!(body["payload"]["items"][1]["status"], "not_attempted");
        assert_eq!(body["payload"]["installed"], json!([]));
    }

    macro_rules! logged_in {
        ($app:expr) => {{
            let req = test::TestRequest::get()
                .uri("/api/mods/portal/loginstatus")
                .to_request();
            let logged_in: bool = test::call_and_read_body_json(&$app, req).await;
            logged_in
        }};
    }

    #[actix_web::test]
    async fn login_status_logout_flow() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api-login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"username": "u", "token": "t"})),
            )
            .mount(&server)
            .await;
        let app = service!(app_data(dir.path(), &server));

        assert!(!logged_in!(app));

        let req = test::TestRequest::post()
            .uri("/api/mods/portal/login")
            .set_json(json!({"username": "u", "password": "p"}))
            .to_request();
        let logged_in: bool = test::call_and_read_body_json(&app, req).await;
        assert!(logged_in);
        assert!(logged_in!(app));

        let req = test::TestRequest::post()
            .uri("/api/mods/portal/logout")
            .to_request();
        let logged_out: bool = test::call_and_read_body_json(&app, req).await;
        assert!(!logged_out);
        assert!(!logged_in!(app));
    }
}
