use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use vecgate_common::{RestCredentials, Result, VecgateError};

use crate::store::KvStore;

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Value,
    error: Option<String>,
}

/// Upstash Redis REST client
///
/// Each call posts one command as a JSON array, e.g. `["GET", "weather:Tokyo"]`.
#[derive(Debug, Clone)]
pub struct UpstashRedisClient {
    base_url: String,
    token: String,
    client: Client,
}

impl UpstashRedisClient {
    /// Create new Upstash Redis client
    pub fn new(credentials: &RestCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Upstash Redis client initialized: {}", credentials.url);
        Ok(Self {
            base_url: credentials.url.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            client,
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Value> {
        debug!("Redis command: {}", args.first().copied().unwrap_or_default());

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .map_err(|e| VecgateError::backend_unavailable(format!("Failed to reach cache: {}", e)))?;

        let status = response.status();
        let body: CommandResponse = response
            .json()
            .await
            .map_err(|e| VecgateError::backend(format!("Failed to parse cache response ({}): {}", status, e)))?;

        parse_command_response(body)
    }
}

fn parse_command_response(body: CommandResponse) -> Result<Value> {
    match body.error {
        Some(error) => Err(VecgateError::backend(format!("Cache command failed: {}", error))),
        None => Ok(body.result),
    }
}

#[async_trait]
impl KvStore for UpstashRedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let ttl = ttl_secs.to_string();
        self.command(&["SET", key, value, "EX", &ttl]).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command(&["DEL", key]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result() {
        let body: CommandResponse = serde_json::from_value(json!({ "result": "OK" })).unwrap();
        assert_eq!(parse_command_response(body).unwrap(), json!("OK"));
    }

    #[test]
    fn test_parse_missing_key() {
        let body: CommandResponse = serde_json::from_value(json!({ "result": null })).unwrap();
        assert_eq!(parse_command_response(body).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_error() {
        let body: CommandResponse =
            serde_json::from_value(json!({ "error": "WRONGPASS invalid password" })).unwrap();
        let err = parse_command_response(body).unwrap_err();
        assert!(err.to_string().contains("WRONGPASS"));
    }
}
