use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Server configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server host address
    #[validate(length(min = 1, message = "HTTP host cannot be empty"))]
    pub http_host: String,

    /// HTTP server port (1-65535)
    #[validate(range(
        min = 1,
        max = 65535,
        message = "HTTP port must be between 1 and 65535"
    ))]
    pub http_port: u16,

    /// JSON file holding the connection profiles
    pub profiles_path: PathBuf,

    /// Per-request timeout in seconds
    #[validate(range(
        min = 1,
        max = 3600,
        message = "Request timeout must be between 1 and 3600 seconds"
    ))]
    pub request_timeout_secs: u64,

    /// Row limit for `/hops` when the request does not give one
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Default hop limit must be between 1 and 100000"
    ))]
    pub default_hop_limit: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8000,
            profiles_path: PathBuf::from("db_connections.json"),
            request_timeout_secs: 300,
            default_hop_limit: 50,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            http_host: env::var("HOPGRAPH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env_var("HOPGRAPH_PORT", "8000")?,
            profiles_path: env::var("HOPGRAPH_PROFILES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("db_connections.json")),
            request_timeout_secs: parse_env_var("HOPGRAPH_REQUEST_TIMEOUT_SECS", "300")?,
            default_hop_limit: parse_env_var("HOPGRAPH_DEFAULT_HOP_LIMIT", "50")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration, then re-validate
    pub fn apply_cli(mut self, cli: CliConfig) -> Result<Self, ConfigError> {
        if let Some(host) = cli.http_host {
            self.http_host = host;
        }
        if let Some(port) = cli.http_port {
            self.http_port = port;
        }
        if let Some(path) = cli.profiles_path {
            self.profiles_path = path;
        }
        if let Some(timeout) = cli.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(limit) = cli.default_hop_limit {
            self.default_hop_limit = limit;
        }

        self.validate()?;
        Ok(self)
    }
}

/// CLI configuration (parsed from command line arguments). Unset fields keep
/// the environment or file value.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub http_host: Option<String>,
    pub http_port: Option<u16>,
    pub profiles_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub default_hop_limit: Option<i64>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
