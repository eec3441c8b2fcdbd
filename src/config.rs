//! Application-level configuration loading: listening port, namespace
//! defaults, UI directories and allowed CORS origins.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAMEPLANE_API_CONFIG_PATH";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_STATIC_DIR: &str = "./static";
const DEFAULT_PUBLIC_DIR: &str = "./public";
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:1313", "http://localhost:3000"];

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server binds on all interfaces.
    pub port: u16,
    /// Namespace used when a request does not name one.
    pub default_namespace: String,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Directory holding the admin UI `index.html`.
    pub public_dir: PathBuf,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        namespace = %app_config.default_namespace,
                        "loaded configuration file"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Blank values are ignored, and an unparsable port keeps the current one.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(raw) = var("PORT").or_else(|| var("SERVER_PORT")) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(err) => warn!(value = %raw, error = %err, "ignoring invalid port"),
            }
        }
        if let Some(namespace) = var("GAMEPLANE_DEFAULT_NAMESPACE") {
            self.default_namespace = namespace.trim().to_string();
        }
        if let Some(dir) = var("GAMEPLANE_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("GAMEPLANE_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(dir);
        }
        if let Some(origins) = var("GAMEPLANE_CORS_ORIGINS") {
            self.cors_origins = split_origins(&origins);
        }
    }

    /// Path of the admin UI entry page.
    pub fn index_file(&self) -> PathBuf {
        self.public_dir.join("index.html")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    default_namespace: Option<String>,
    static_dir: Option<PathBuf>,
    public_dir: Option<PathBuf>,
    cors_origins: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            default_namespace: value
                .default_namespace
                .filter(|ns| !ns.is_empty())
                .unwrap_or(defaults.default_namespace),
            static_dir: value.static_dir.unwrap_or(defaults.static_dir),
            public_dir: value.public_dir.unwrap_or(defaults.public_dir),
            cors_origins: value.cors_origins.unwrap_or(defaults.cors_origins),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}
