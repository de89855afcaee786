use crate::error::VecgateError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// REST endpoint plus bearer token of a hosted service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestCredentials {
    pub url: String,
    pub token: String,
}

/// vecgate application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory, console only when unset
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// Upstash Vector REST credentials
    pub vector: Option<RestCredentials>,

    /// Upstash Redis REST credentials
    pub redis: Option<RestCredentials>,

    /// weatherapi.com key
    pub weather_api_key: Option<String>,

    /// Current-weather endpoint
    pub weather_api_url: String,

    /// Weather cache TTL in seconds
    pub cache_ttl_secs: u64,

    /// topK used when the query omits it or gives a non-positive value
    pub default_top_k: u32,

    /// Score cutoff used when the query omits it
    pub default_threshold: f64,

    /// Length of the demo workflow's named sleep
    pub workflow_sleep_secs: u64,

    /// Finished workflow runs kept for lookup; older ones are evicted
    pub workflow_max_finished_runs: usize,

    /// Largest accepted write body in bytes
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            log_dir: None,
            log_level: "info".to_string(),
            vector: None,
            redis: None,
            weather_api_key: None,
            weather_api_url: "https://api.weatherapi.com/v1/current.json".to_string(),
            cache_ttl_secs: 3600,
            default_top_k: 10,
            default_threshold: 0.7,
            workflow_sleep_secs: 5,
            workflow_max_finished_runs: 100,
            max_body_bytes: 256 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, VecgateError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let config = Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            vector: Self::get_credentials("UPSTASH_VECTOR_REST_URL", "UPSTASH_VECTOR_REST_TOKEN"),
            redis: Self::get_credentials("UPSTASH_REDIS_REST_URL", "UPSTASH_REDIS_REST_TOKEN"),
            weather_api_key: Self::get_env_nonempty("WEATHER_API_KEY"),
            weather_api_url: std::env::var("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            cache_ttl_secs: Self::get_env_parsed("CACHE_TTL_SECS")?
                .unwrap_or(defaults.cache_ttl_secs),
            default_top_k: Self::get_env_parsed("DEFAULT_TOP_K")?.unwrap_or(defaults.default_top_k),
            default_threshold: Self::get_env_parsed("DEFAULT_THRESHOLD")?
                .unwrap_or(defaults.default_threshold),
            workflow_sleep_secs: Self::get_env_parsed("WORKFLOW_SLEEP_SECS")?
                .unwrap_or(defaults.workflow_sleep_secs),
            workflow_max_finished_runs: Self::get_env_parsed("WORKFLOW_MAX_FINISHED_RUNS")?
                .unwrap_or(defaults.workflow_max_finished_runs),
            max_body_bytes: Self::get_env_parsed("MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes),
        };

        config.validate()?;

        Ok(config)
    }

    fn get_env_nonempty(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Both halves must be present, otherwise the integration is off
    fn get_credentials(url_key: &str, token_key: &str) -> Option<RestCredentials> {
        let url = Self::get_env_nonempty(url_key)?;
        let token = Self::get_env_nonempty(token_key)?;
        Some(RestCredentials {
            url: url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, VecgateError> {
        match Self::get_env_nonempty(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| VecgateError::config(format!("{} has an invalid value: {}", key, raw))),
        }
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), VecgateError> {
        for (name, creds) in [("Vector", &self.vector), ("Redis", &self.redis)] {
            if let Some(creds) = creds {
                if !creds.url.starts_with("http://") && !creds.url.starts_with("https://") {
                    return Err(VecgateError::config(format!(
                        "Upstash {} REST URL must start with http:// or https://",
                        name
                    )));
                }
            }
        }

        if !self.weather_api_url.starts_with("http://") && !self.weather_api_url.starts_with("https://") {
            return Err(VecgateError::config(
                "Weather API URL must start with http:// or https://",
            ));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(VecgateError::config("Server port cannot be 0"));
        }

        if self.max_body_bytes == 0 {
            return Err(VecgateError::config("Max body size cannot be 0"));
        }

        if !(1..=100).contains(&self.default_top_k) {
            return Err(VecgateError::config("Default topK must be within 1..=100"));
        }

        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(VecgateError::config("Default threshold must be within 0..=1"));
        }

        Ok(())
    }
}
