//! Configuration management with layered settings.
//!
//! Settings are resolved from three layers, later layers winning: the
//! embedded `config.toml` defaults, an optional `config.toml` next to the
//! binary, and `TOURMUSE__`-prefixed environment variables (for example
//! `TOURMUSE__ENGINE__MODEL=mistral`; `server.cors_origins` takes a
//! comma-separated list).

use anyhow::{bail, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Top-level settings for the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub context: ContextConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Completion engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine backend, `ollama` or `echo`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Per-user context store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Upper bound on tracked users before the oldest entry is evicted.
    pub max_users: usize,
    /// Optional idle expiry for stored contexts, in seconds.
    pub ttl_seconds: Option<u64>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_users: 10_000,
            ttl_seconds: None,
        }
    }
}

impl Settings {
    /// Load settings from embedded defaults, an optional local config file,
    /// and environment variables.
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("TOURMUSE")
                    .separator("__")
                    .list_separator(",")
                    // Only cors_origins is list-typed; unscoped list parsing
                    // would swallow every string-typed override.
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        match self.engine.provider.as_str() {
            "ollama" => {
                if self.engine.base_url.trim().is_empty() {
                    bail!("engine.base_url must be set for the ollama provider");
                }
                if self.engine.model.trim().is_empty() {
                    bail!("engine.model must be set for the ollama provider");
                }
            }
            "echo" => {}
            other => bail!("unknown engine.provider '{}', expected ollama or echo", other),
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            bail!("logging.format must be 'text' or 'json'");
        }
        if self.context.max_users == 0 {
            bail!("context.max_users must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn embedded_config_matches_the_coded_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        settings.validate().unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.engine.provider, "ollama");
        assert_eq!(settings.context.max_users, 10_000);
        assert!(settings.context.ttl_seconds.is_none());
    }

    #[test]
    fn environment_variables_override_the_defaults() {
        std::env::set_var("TOURMUSE__ENGINE__MODEL", "mistral");
        std::env::set_var(
            "TOURMUSE__SERVER__CORS_ORIGINS",
            "http://localhost:3000,http://localhost:5173",
        );
        let settings = Settings::load().unwrap();
        std::env::remove_var("TOURMUSE__ENGINE__MODEL");
        std::env::remove_var("TOURMUSE__SERVER__CORS_ORIGINS");

        // String-typed overrides must stay strings; only cors_origins is
        // split on commas.
        assert_eq!(settings.engine.model, "mistral");
        assert_eq!(settings.engine.provider, "ollama");
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut settings = Settings::default();
        settings.engine.provider = "gpt".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("engine.provider"));
    }

    #[test]
    fn ollama_without_a_base_url_is_rejected() {
        let mut settings = Settings::default();
        settings.engine.base_url = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn echo_provider_needs_no_base_url() {
        let mut settings = Settings::default();
        settings.engine.provider = "echo".to_string();
        settings.engine.base_url = String::new();
        settings.validate().unwrap();
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let mut settings = Settings::default();
        settings.logging.format = "xml".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_max_users_is_rejected() {
        let mut settings = Settings::default();
        settings.context.max_users = 0;
        assert!(settings.validate().is_err());
    }
}
