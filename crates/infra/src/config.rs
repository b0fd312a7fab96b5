//! Configuration loading and representation.
//!
//! Sources, lowest precedence first: built-in defaults, an optional JSON file
//! named by `MARGINALIA_CONFIG`, then individual environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use marginalia_comments::{CommentSettings, EngineVersion, NamespaceSettings};

use crate::relations::DirectoryLabels;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_ENGINE_VERSION: EngineVersion = EngineVersion::new(7, 1, 0);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// Application-wide comment defaults.
    pub comments: CommentSettings,
    /// Registered namespaces, in menu/scope order.
    pub namespaces: Vec<NamespaceSettings>,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    /// `"major.minor.patch"` of the relation engine.
    #[serde(deserialize_with = "version_from_str")]
    pub relation_engine_version: EngineVersion,
    /// Display labels for authors and resources; unknown refs render as
    /// `Type #id`.
    pub labels: DirectoryLabels,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            comments: CommentSettings::default(),
            namespaces: vec![NamespaceSettings::named("admin")],
            use_persistent_stores: false,
            database_url: None,
            relation_engine_version: DEFAULT_ENGINE_VERSION,
            labels: DirectoryLabels::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `env` as the variable source.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env("MARGINALIA_CONFIG") {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        config.apply_env(&env)?;

        if config.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set; using the development secret");
        }
        Ok(config)
    }

    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = env("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = env("JWT_SECRET") {
            self.jwt_secret = v;
        }
        if let Some(v) = env("MARGINALIA_NAMESPACES") {
            self.namespaces = v
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(|name| {
                    // Keep per-namespace overrides from the file.
                    self.namespaces
                        .iter()
                        .find(|ns| ns.name == name)
                        .cloned()
                        .unwrap_or_else(|| NamespaceSettings::named(name))
                })
                .collect();
        }
        if let Some(v) = env("COMMENTS_ENABLED") {
            self.comments.comments = parse_bool("COMMENTS_ENABLED", &v)?;
        }
        if let Some(v) = env("COMMENTS_READ_ALL_NAMESPACES") {
            self.comments.read_all_namespaces = parse_bool("COMMENTS_READ_ALL_NAMESPACES", &v)?;
        }
        if let Some(v) = env("COMMENTS_ORDER") {
            self.comments.order = v;
        }
        if let Some(v) = env("COMMENTS_REGISTRATION_NAME") {
            self.comments.registration_name = v;
        }
        if let Some(v) = env("USE_PERSISTENT_STORES") {
            self.use_persistent_stores = parse_bool("USE_PERSISTENT_STORES", &v)?;
        }
        if let Some(v) = env("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = env("RELATION_ENGINE_VERSION") {
            self.relation_engine_version = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RELATION_ENGINE_VERSION",
                value: v.clone(),
            })?;
        }
        Ok(())
    }
}

fn version_from_str<'de, D>(deserializer: D) -> Result<EngineVersion, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
