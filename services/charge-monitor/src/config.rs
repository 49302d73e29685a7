//! Configuration types and loading
//!
//! Config path precedence: `--config` CLI arg > `CONFIG_PATH` env var >
//! `charge-monitor.toml`. Every field has a default, so an empty file
//! yields a working configuration against Tesla's production endpoints.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tesla_auth::OAuthSettings;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tesla: TeslaConfig,
}

/// HTTP listener and outbound client settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Timeout for each outbound call to Tesla
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Tesla OAuth client and endpoint settings
#[derive(Debug, Deserialize)]
pub struct TeslaConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: String,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_timeout() -> u64 {
    10
}

fn default_max_connections() -> usize {
    100
}

fn default_client_id() -> String {
    tesla_auth::TESLA_CLIENT_ID.to_string()
}

fn default_redirect_uri() -> String {
    tesla_auth::REDIRECT_URI.to_string()
}

fn default_authorize_url() -> String {
    tesla_auth::AUTHORIZE_ENDPOINT.to_string()
}

fn default_token_url() -> String {
    tesla_auth::TOKEN_ENDPOINT.to_string()
}

fn default_api_base_url() -> String {
    tesla_api::OWNER_API_BASE_URL.to_string()
}

fn default_scopes() -> String {
    tesla_auth::SCOPES.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            timeout_secs: default_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for TeslaConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
        }
    }
}

impl TeslaConfig {
    pub fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            authorize_endpoint: self.authorize_url.clone(),
            token_endpoint: self.token_url.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        for (name, url) in [
            ("authorize_url", &self.tesla.authorize_url),
            ("token_url", &self.tesla.token_url),
            ("api_base_url", &self.tesla.api_base_url),
            ("redirect_uri", &self.tesla.redirect_uri),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if self.tesla.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }

        if self.server.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("charge-monitor.toml")
    }
}
