use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vecgate_common::{Result, VecgateError};

use crate::store::KvStore;

pub const MAX_CITY_LEN: usize = 100;

/// Trim, bound the length and strip everything but letters, digits, whitespace, `,` and `-`
pub fn validate_city(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_CITY_LEN {
        return None;
    }

    let city: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == ',' || *c == '-')
        .collect();

    (!city.is_empty()).then_some(city)
}

/// Source of current-weather data
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<Value>;
}

/// weatherapi.com client
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_url: String,
    api_key: Option<String>,
    client: Client,
}

impl WeatherApiClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            api_url: api_url.into(),
            api_key,
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn current(&self, city: &str) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| VecgateError::config("Weather API key is not configured"))?;

        info!("Fetching weather data for: {}", city);
        let response = self
            .client
            .get(&self.api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("key", api_key), ("q", city)])
            .send()
            .await
            .map_err(|e| VecgateError::backend_unavailable(format!("Failed to reach weather API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let details = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            warn!("Weather API error: {} {}", status, details);
            return Err(VecgateError::upstream(status.as_u16(), details));
        }

        response
            .json()
            .await
            .map_err(|e| VecgateError::backend(format!("Failed to parse weather response: {}", e)))
    }
}

/// Weather payload plus whether it came from the cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherLookup {
    pub weather: Value,
    pub cached: bool,
}

/// Cache-aside weather lookup
#[derive(Clone)]
pub struct WeatherService {
    cache: Option<Arc<dyn KvStore>>,
    provider: Arc<dyn WeatherProvider>,
    ttl_secs: u64,
}

impl WeatherService {
    /// Without a cache every lookup goes to the provider
    pub fn new(cache: Option<Arc<dyn KvStore>>, provider: Arc<dyn WeatherProvider>, ttl_secs: u64) -> Self {
        Self {
            cache,
            provider,
            ttl_secs,
        }
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    fn cache_key(city: &str) -> String {
        format!("weather:{}", city)
    }

    /// Current weather for an already validated city
    pub async fn lookup(&self, city: &str) -> Result<WeatherLookup> {
        let key = Self::cache_key(city);

        if let Some(cache) = &self.cache {
            if let Some(raw) = cache.get(&key).await? {
                match serde_json::from_str::<Value>(&raw) {
                    Ok(weather) => {
                        debug!("Weather cache hit: {}", key);
                        return Ok(WeatherLookup {
                            weather,
                            cached: true,
                        });
                    }
                    Err(e) => {
                        warn!("Cache parse error for {}: {}", key, e);
                        cache.delete(&key).await?;
                    }
                }
            }
        }

        let weather = self.provider.current(city).await?;

        if let Some(cache) = &self.cache {
            let raw = serde_json::to_string(&weather)?;
            cache.set_with_expiry(&key, &raw, self.ttl_secs).await?;
        }

        Ok(WeatherLookup {
            weather,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, (String, u64)>>,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl KvStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
        }

        async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl_secs));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn current(&self, city: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "location": { "name": city }, "current": { "temp_c": 21.5 } }))
        }
    }

    #[test]
    fn test_validate_city() {
        assert_eq!(validate_city(Some("  Tokyo ")), Some("Tokyo".to_string()));
        assert_eq!(validate_city(Some("New York, US")), Some("New York, US".to_string()));
        assert_eq!(validate_city(Some("Paris<script>")), Some("Parisscript".to_string()));
        assert_eq!(validate_city(Some("東京")), None);
        assert_eq!(validate_city(Some("   ")), None);
        assert_eq!(validate_city(None), None);
        assert_eq!(validate_city(Some(&"a".repeat(101))), None);
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let store = Arc::new(MemoryStore::default());
        let provider = Arc::new(CountingProvider::default());
        let service = WeatherService::new(Some(store.clone()), provider.clone(), 3600);

        let first = service.lookup("Tokyo").await.unwrap();
        assert!(!first.cached);

        let second = service.lookup("Tokyo").await.unwrap();
        assert!(second.cached);
        assert_eq!(second.weather, first.weather);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.get("weather:Tokyo").map(|(_, ttl)| *ttl), Some(3600));
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_refetched() {
        let store = Arc::new(MemoryStore::default());
        store
            .set_with_expiry("weather:Oslo", "{not json", 60)
            .await
            .unwrap();
        let provider = Arc::new(CountingProvider::default());
        let service = WeatherService::new(Some(store.clone()), provider.clone(), 60);

        let lookup = service.lookup("Oslo").await.unwrap();

        assert!(!lookup.cached);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_without_cache() {
        let provider = Arc::new(CountingProvider::default());
        let service = WeatherService::new(None, provider.clone(), 60);

        assert!(!service.lookup("Lima").await.unwrap().cached);
        assert!(!service.lookup("Lima").await.unwrap().cached);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = WeatherApiClient::new("https://api.weatherapi.com/v1/current.json", None).unwrap();
        let err = client.current("Tokyo").await.unwrap_err();
        assert!(matches!(err, VecgateError::Config(_)));
    }
}
