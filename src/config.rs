// Process-wide settings, loaded once at startup and passed down explicitly
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::dispatch::DispatcherConfig;
use crate::error::RelayError;

pub const DEFAULT_CONFIG_FILE: &str = "prompt-relay";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    // Unset means no deadline
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OllamaSettings {
    pub base_url: String,
    pub story_model: String,
    pub poem_model: String,
    pub chat_model: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenAISettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    // Left to the backend's default when unset
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TracingSettings {
    pub enabled: bool,
    pub project: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelayConfig {
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub ollama: OllamaSettings,
    pub openai: OpenAISettings,
    pub tracing: TracingSettings,
}

impl RelayConfig {
    pub fn load() -> Result<Self, RelayError> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Precedence, lowest first: built-in defaults and the conventional
    /// `OPENAI_API_KEY` / `LANGCHAIN_*` variables, then the optional file
    /// `path` (any format the `config` crate knows), then `RELAY_*` variables
    /// such as `RELAY_CLIENT__BASE_URL`.
    pub fn from_file(path: &str) -> Result<Self, RelayError> {
        let mut builder = Config::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 8000)?
            .set_default("server.title", "Langchain Server")?
            .set_default("client.base_url", "http://localhost:8000")?
            .set_default("ollama.base_url", "http://localhost:11434")?
            .set_default("ollama.story_model", "llama3.2")?
            .set_default("ollama.poem_model", "gemma3")?
            .set_default("ollama.chat_model", "gemma3")?
            .set_default("openai.base_url", "https://api.openai.com/v1")?
            .set_default("openai.model", "gpt-3.5-turbo")?
            .set_default("tracing.enabled", false)?;

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.set_default("openai.api_key", api_key)?;
        }
        if let Ok(api_key) = std::env::var("LANGCHAIN_API_KEY") {
            builder = builder.set_default("tracing.api_key", api_key)?;
        }
        if let Ok(project) = std::env::var("LANGCHAIN_PROJECT") {
            builder = builder.set_default("tracing.project", project)?;
        }
        if let Ok(flag) = std::env::var("LANGCHAIN_TRACING_V2") {
            builder = builder.set_default("tracing.enabled", parse_flag(&flag))?;
        }

        let settings = builder
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            timeout: self.client.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: [&str; 10] = [
        "OPENAI_API_KEY",
        "LANGCHAIN_API_KEY",
        "LANGCHAIN_PROJECT",
        "LANGCHAIN_TRACING_V2",
        "RELAY_CLIENT__BASE_URL",
        "RELAY_CLIENT__TIMEOUT_SECS",
        "RELAY_SERVER__PORT",
        "RELAY_TRACING__ENABLED",
        "RELAY_OPENAI__TEMPERATURE",
        "RELAY_OPENAI__MAX_TOKENS",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = RelayConfig::from_file("does-not-exist.toml").unwrap();

        assert_eq!(config.client.base_url, "http://localhost:8000");
        assert_eq!(config.client.timeout_secs, None);
        assert_eq!(config.dispatcher_config(), DispatcherConfig::default());
        assert_eq!(config.server_address(), "localhost:8000");
        assert_eq!(config.ollama.story_model, "llama3.2");
        assert_eq!(config.ollama.poem_model, "gemma3");
        assert_eq!(config.openai.api_key, None);
        assert_eq!(config.openai.temperature, None);
        assert!(!config.tracing.enabled);
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[client]\nbase_url = \"http://models.internal:9000\"\ntimeout_secs = 30\n\n[server]\nport = 8100"
        )
        .unwrap();

        let config = RelayConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.client.base_url, "http://models.internal:9000");
        assert_eq!(config.dispatcher_config().timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.server.port, 8100);
        assert_eq!(config.server.host, "localhost");
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "sk-legacy");
        std::env::set_var("LANGCHAIN_TRACING_V2", "true");
        std::env::set_var("RELAY_CLIENT__BASE_URL", "http://gateway:8080");
        std::env::set_var("RELAY_CLIENT__TIMEOUT_SECS", "5");

        let config = RelayConfig::from_file("does-not-exist.toml");
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-legacy"));
        assert!(config.tracing.enabled);
        assert_eq!(config.client.base_url, "http://gateway:8080");
        assert_eq!(config.client.timeout_secs, Some(5));
    }

    #[test]
    #[serial]
    fn test_relay_tracing_flag_wins_over_langchain_variable() {
        clear_env();
        std::env::set_var("LANGCHAIN_TRACING_V2", "false");
        std::env::set_var("RELAY_TRACING__ENABLED", "true");

        let config = RelayConfig::from_file("does-not-exist.toml");
        clear_env();

        assert!(config.unwrap().tracing.enabled);
    }

    #[test]
    #[serial]
    fn test_openai_sampling_from_environment() {
        clear_env();
        std::env::set_var("RELAY_OPENAI__TEMPERATURE", "0.25");
        std::env::set_var("RELAY_OPENAI__MAX_TOKENS", "64");

        let config = RelayConfig::from_file("does-not-exist.toml");
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.openai.temperature, Some(0.25));
        assert_eq!(config.openai.max_tokens, Some(64));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
