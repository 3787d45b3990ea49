use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub admin: AdminSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Backend serving the public endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Backend serving `/api/admin/*`; falls back to `base_url`.
    #[serde(default)]
    pub admin_base_url: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            admin_base_url: None,
        }
    }
}

impl ApiSettings {
    pub fn admin_base_url(&self) -> &str {
        self.admin_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector, e.g. `http://tempo:4317`. Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "key-portal".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Admin credentials used by the `key-portal` binary; the library never reads them.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AdminSettings {
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Cannot read current directory: {}", e)))?;

    portal_core::config::load_settings(&configuration_directory(base_path))
}

// Works from both the workspace root and the crate directory.
fn configuration_directory(base_path: PathBuf) -> PathBuf {
    if base_path.ends_with("key-portal") {
        base_path.join("config")
    } else {
        base_path.join("key-portal").join("config")
    }
}
