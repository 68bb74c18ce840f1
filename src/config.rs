//! Service configuration.
//!
//! Resolution order: built-in defaults, then a TOML file (`--config` or
//! `SMARTCITY_CONFIG`), then `SMARTCITY_*` environment overrides.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::OllamaConfig;
use crate::store::FusekiConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SMARTCITY_CONFIG";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(smartcity::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {path}: {message}")]
    #[diagnostic(
        code(smartcity::config::parse),
        help("Check the TOML syntax. Sections are [server], [store] and [llm].")
    )]
    Parse { path: String, message: String },

    #[error("invalid value for {var}: \"{value}\"")]
    #[diagnostic(
        code(smartcity::config::env),
        help("Ports and timeouts are integers; SMARTCITY_LLM_ENABLED takes true/false/1/0.")
    )]
    InvalidEnv { var: String, value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Triple store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_fuseki_url")]
    pub fuseki_url: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

/// Model server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    /// Rediscover the schema from the store for every prompt.
    #[serde(default)]
    pub discover_schema: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_bind() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_fuseki_url() -> String {
    "http://localhost:3030".into()
}
fn default_dataset() -> String {
    "smartcity".into()
}
fn default_store_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "codellama:7b".into()
}
fn default_llm_timeout() -> u64 {
    90
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fuseki_url: default_fuseki_url(),
            dataset: default_dataset(),
            timeout_secs: default_store_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ollama_url: default_ollama_url(),
            model: default_model(),
            timeout_secs: default_llm_timeout(),
            discover_schema: false,
        }
    }
}

impl AppConfig {
    /// Load the configuration using the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load the configuration with an explicit environment lookup.
    pub fn load_with<F>(path: Option<&Path>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_with(env)?;
        Ok(config)
    }

    /// Parse a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `SMARTCITY_*` overrides.
    pub fn apply_env_with<F>(&mut self, env: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("SMARTCITY_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env("SMARTCITY_PORT") {
            self.server.port = parse_env("SMARTCITY_PORT", &v)?;
        }
        if let Some(v) = env("SMARTCITY_FUSEKI_URL") {
            self.store.fuseki_url = v;
        }
        if let Some(v) = env("SMARTCITY_DATASET") {
            self.store.dataset = v;
        }
        if let Some(v) = env("SMARTCITY_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_env("SMARTCITY_STORE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("SMARTCITY_OLLAMA_URL") {
            self.llm.ollama_url = v;
        }
        if let Some(v) = env("SMARTCITY_OLLAMA_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env("SMARTCITY_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_env("SMARTCITY_LLM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("SMARTCITY_LLM_ENABLED") {
            self.llm.enabled = parse_bool("SMARTCITY_LLM_ENABLED", &v)?;
        }
        Ok(())
    }

    pub fn fuseki(&self) -> FusekiConfig {
        FusekiConfig {
            base_url: self.store.fuseki_url.clone(),
            dataset: self.store.dataset.clone(),
            timeout_secs: self.store.timeout_secs,
        }
    }

    pub fn ollama(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.llm.ollama_url.clone(),
            model: self.llm.model.clone(),
            timeout_secs: self.llm.timeout_secs,
        }
    }

    /// `bind:port` for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::load_with(None, env_of(&[])).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:8000");
        assert_eq!(config.fuseki().query_url(), "http://localhost:3030/smartcity/sparql");
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.llm.model, "codellama:7b");
        assert_eq!(config.llm.timeout_secs, 90);
        assert!(config.llm.enabled);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("smartcity.toml");
        std::fs::write(&path, "[store]\ndataset = \"city\"\n\n[llm]\nmodel = \"mistral\"\n").unwrap();

        let config = AppConfig::load_with(Some(&path), env_of(&[])).unwrap();
        assert_eq!(config.store.dataset, "city");
        assert_eq!(config.store.fuseki_url, "http://localhost:3030");
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn env_overrides_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("smartcity.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let env = env_of(&[
            ("SMARTCITY_PORT", "9100"),
            ("SMARTCITY_FUSEKI_URL", "http://fuseki:3030"),
            ("SMARTCITY_LLM_ENABLED", "false"),
            ("SMARTCITY_LLM_TIMEOUT_SECS", "15"),
        ]);
        let config = AppConfig::load_with(Some(&path), env).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.store.fuseki_url, "http://fuseki:3030");
        assert!(!config.llm.enabled);
        assert_eq!(config.ollama().timeout_secs, 15);
    }

    #[test]
    fn config_path_from_env() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("c.toml");
        std::fs::write(&path, "[store]\ndataset = \"fromenv\"\n").unwrap();
        let path_str = path.display().to_string();
        let config = AppConfig::load_with(None, env_of(&[(CONFIG_ENV, &path_str)])).unwrap();
        assert_eq!(config.store.dataset, "fromenv");
    }

    #[test]
    fn invalid_env_value() {
        let err = AppConfig::load_with(None, env_of(&[("SMARTCITY_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn missing_file() {
        let err = AppConfig::load_with(Some(Path::new("/nonexistent/smartcity.toml")), env_of(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[store\n").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
