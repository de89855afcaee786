use std::sync::Arc;
use tracing::{info, warn};
use vecgate_cache::{KvStore, UpstashRedisClient, WeatherApiClient, WeatherProvider, WeatherService};
use vecgate_common::{AppConfig, Result};
use vecgate_vector::{QueryDefaults, UpstashVectorClient, VectorBackend, VectorService};
use vecgate_workflow::WorkflowRegistry;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Vector request normalizer
    pub vector: VectorService,

    /// Cached weather lookup
    pub weather: WeatherService,

    /// Whether a weather API key is present
    pub weather_configured: bool,

    /// Workflow runs
    pub workflows: Arc<WorkflowRegistry>,
}

impl AppState {
    /// Build every backend client once from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let vector_backend = match &config.vector {
            Some(credentials) => {
                Some(Arc::new(UpstashVectorClient::new(credentials)?) as Arc<dyn VectorBackend>)
            }
            None => {
                warn!("UPSTASH_VECTOR_REST_URL/TOKEN not set, vector endpoints will fail");
                None
            }
        };

        let cache = match &config.redis {
            Some(credentials) => Some(Arc::new(UpstashRedisClient::new(credentials)?) as Arc<dyn KvStore>),
            None => {
                warn!("UPSTASH_REDIS_REST_URL/TOKEN not set, weather lookups are not cached");
                None
            }
        };

        let weather_client =
            WeatherApiClient::new(config.weather_api_url.clone(), config.weather_api_key.clone())?;
        let weather_configured = weather_client.is_configured();
        if !weather_configured {
            warn!("WEATHER_API_KEY not set, weather lookups will fail");
        }

        let state = Self::from_parts(
            config.clone(),
            VectorService::new(vector_backend, QueryDefaults::from_config(&config)),
            WeatherService::new(
                cache,
                Arc::new(weather_client) as Arc<dyn WeatherProvider>,
                config.cache_ttl_secs,
            ),
            weather_configured,
        );

        info!(
            vector = state.vector.is_configured(),
            cache = state.weather.has_cache(),
            weather = weather_configured,
            "Application state initialized"
        );

        Ok(state)
    }

    /// Assemble state from already built services
    pub fn from_parts(
        config: AppConfig,
        vector: VectorService,
        weather: WeatherService,
        weather_configured: bool,
    ) -> Self {
        let workflows = Arc::new(WorkflowRegistry::with_max_finished(
            config.workflow_max_finished_runs,
        ));

        Self {
            config,
            vector,
            weather,
            weather_configured,
            workflows,
        }
    }
}
