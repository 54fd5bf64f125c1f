use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the ragfront server.
///
/// The backend secrets are not validated at startup: an absent value is
/// carried as empty/unset and only surfaces when Weaviate rejects a request.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the Weaviate instance that stores the documents.
    pub weaviate_url: String,
    /// Optional API key required to access Weaviate.
    pub weaviate_api_key: Option<String>,
    /// Optional OpenAI API key forwarded to Weaviate's generative module.
    pub openai_api_key: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            weaviate_url: env::var("WEAVIATE_URL").unwrap_or_default(),
            weaviate_api_key: load_env_optional("WEAVIATE_API_KEY"),
            openai_api_key: load_env_optional("OPENAI_API_KEY"),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        weaviate_url = %config.weaviate_url,
        has_weaviate_api_key = config.weaviate_api_key.is_some(),
        has_openai_api_key = config.openai_api_key.is_some(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
