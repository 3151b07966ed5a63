use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};

use crate::auth::FactorioAuth;
use crate::credentials::CredentialStore;
use crate::installer::Installer;
use crate::mods::{DownloadManager, DownloadOptions};
use crate::portal::PortalClient;

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub debug: bool,
    pub mods_dir: PathBuf,
    pub credentials_path: PathBuf,
    pub portal_url: Url,
    pub auth_url: Url,
    pub request_timeout: Duration,
    pub max_download_mb: Option<u32>,
    pub verify_downloads: bool,
}

#[derive(Clone)]
pub struct AppData {
    installer: Arc<Installer<PortalClient>>,
    credentials: Arc<CredentialStore>,
    auth: Arc<FactorioAuth>,
    port: u16,
    debug: bool,
}

pub fn read_settings() -> anyhow::Result<Settings> {
    let port = dotenvy::var("PORT")
        .unwrap_or("8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);
    let debug = dotenvy::var("APP_DEBUG").unwrap_or("0".to_string()) == "1";
    let mods_dir = dotenvy::var("MODS_DIR").unwrap_or("./mods".to_string());
    let credentials_path =
        dotenvy::var("CREDENTIALS_PATH").unwrap_or("./mod-portal-credentials.json".to_string());
    let portal_url =
        dotenvy::var("MOD_PORTAL_URL").unwrap_or("https://mods.factorio.com".to_string());
    let auth_url =
        dotenvy::var("AUTH_URL").unwrap_or("https://auth.factorio.com/api-login".to_string());
    let request_timeout = dotenvy::var("REQUEST_TIMEOUT_SECS")
        .unwrap_or("300".to_string())
        .parse::<u64>()
        .unwrap_or(300);
    let max_download_mb = dotenvy::var("MAX_MOD_FILESIZE_MB")
        .ok()
        .and_then(|x| x.parse::<u32>().ok())
        .filter(|&mb| mb > 0);
    let verify_downloads = dotenvy::var("VERIFY_DOWNLOADS").unwrap_or("0".to_string()) == "1";

    Ok(Settings {
        port,
        debug,
        mods_dir: PathBuf::from(mods_dir),
        credentials_path: PathBuf::from(credentials_path),
        portal_url: Url::parse(&portal_url)
            .with_context(|| format!("Invalid MOD_PORTAL_URL {}", portal_url))?,
        auth_url: Url::parse(&auth_url).with_context(|| format!("Invalid AUTH_URL {}", auth_url))?,
        request_timeout: Duration::from_secs(request_timeout),
        max_download_mb,
        verify_downloads,
    })
}

pub fn build_config(settings: &Settings) -> anyhow::Result<AppData> {
    let client = Client::builder()
        .user_agent(concat!("mod-portal-installer/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .timeout(settings.request_timeout)
        .build()
        .context("Failed to build http client")?;

    let credentials = Arc::new(CredentialStore::new(&settings.credentials_path));
    let downloads = DownloadManager::new(
        client.clone(),
        &settings.mods_dir,
        settings.portal_url.clone(),
        DownloadOptions {
            max_download_mb: settings.max_download_mb,
            verify_hashes: settings.verify_downloads,
        },
    );
    let portal = PortalClient::new(client.clone(), settings.portal_url.clone());
    let installer = Installer::new(portal, downloads, credentials.clone());

    Ok(AppData {
        installer: Arc::new(installer),
        credentials,
        auth: Arc::new(FactorioAuth::new(client, settings.auth_url.clone())),
        port: settings.port,
        debug: settings.debug,
    })
}

impl AppData {
    pub fn installer(&self) -> &Installer<PortalClient> {
        &self.installer
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn auth(&self) -> &FactorioAuth {
        &self.auth
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}
