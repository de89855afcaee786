use actix_web::{web, HttpRequest};
use std::collections::HashMap;
use vecgate_common::VecgateError;

use crate::error::ApiError;

pub mod system;
pub mod vector;
pub mod weather;
pub mod workflow;

/// Mount every endpoint under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(vector::upsert_vector)
            .service(vector::query_vector)
            .service(weather::get_weather)
            .service(workflow::start_workflow)
            .service(workflow::list_workflows)
            .service(workflow::get_workflow)
            .service(system::health),
    );
}

/// Decoded query-string values; a repeated key keeps its first value
pub(crate) fn first_query_values(
    req: &HttpRequest,
    request_id: &str,
) -> Result<HashMap<String, String>, ApiError> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(req.query_string()).map_err(|e| {
        ApiError::new(
            request_id,
            VecgateError::invalid_input(format!("invalid query string: {}", e)),
        )
    })?;

    let mut values = HashMap::new();
    for (key, value) in pairs.into_inner() {
        values.entry(key).or_insert(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use vecgate_cache::{KvStore, WeatherProvider, WeatherService};
    use vecgate_common::{AppConfig, EmbedOperation, Result, VecgateError};
    use vecgate_vector::{Match, QueryDefaults, QueryPayload, UpsertPayload, VectorBackend, VectorService};

    #[derive(Default)]
    struct FakeBackend {
        upserts: Mutex<Vec<Value>>,
        queries: Mutex<Vec<Value>>,
        reject_embedding: bool,
    }

    #[async_trait]
    impl VectorBackend for FakeBackend {
        async fn upsert(&self, payload: UpsertPayload) -> Result<()> {
            if self.reject_embedding && matches!(payload, UpsertPayload::Data { .. }) {
                return Err(VecgateError::EmbedderNotConfigured(EmbedOperation::Upsert));
            }
            self.upserts.lock().unwrap().push(serde_json::to_value(&payload)?);
            Ok(())
        }

        async fn query(&self, payload: QueryPayload) -> Result<Vec<Match>> {
            let value = serde_json::to_value(&payload)?;
            if self.reject_embedding && value.get("data").is_some() {
                return Err(VecgateError::EmbedderNotConfigured(EmbedOperation::Query));
            }
            self.queries.lock().unwrap().push(value);
            Ok(vec![
                fake_match("a", Some(0.92)),
                fake_match("b", Some(0.55)),
                fake_match("c", None),
            ])
        }
    }

    fn fake_match(id: &str, score: Option<f64>) -> Match {
        Match {
            id: id.to_string(),
            score,
            metadata: Some(json!({ "category": "books" })),
            data: None,
            vector: None,
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl KvStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set_with_expiry(&self, key: &str, value: &str, _ttl_secs: u64) -> Result<()> {
            self.entries.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct StaticWeather;

    #[async_trait]
    impl WeatherProvider for StaticWeather {
        async fn current(&self, city: &str) -> Result<Value> {
            if city == "Atlantis" {
                return Err(VecgateError::upstream(400, "No matching location found."));
            }
            Ok(json!({ "location": { "name": city }, "current": { "temp_c": 21.0 } }))
        }
    }

    fn state_with(backend: Option<Arc<FakeBackend>>) -> Arc<AppState> {
        state_with_config(
            backend,
            AppConfig {
                workflow_sleep_secs: 0,
                ..AppConfig::default()
            },
        )
    }

    fn state_with_config(backend: Option<Arc<FakeBackend>>, config: AppConfig) -> Arc<AppState> {
        let vector = VectorService::new(
            backend.map(|b| b as Arc<dyn VectorBackend>),
            QueryDefaults::default(),
        );
        let weather = WeatherService::new(
            Some(Arc::new(MemoryStore::default()) as Arc<dyn KvStore>),
            Arc::new(StaticWeather) as Arc<dyn WeatherProvider>,
            60,
        );
        Arc::new(AppState::from_parts(config, vector, weather, true))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_text_write_goes_to_data_upsert() {
        let backend = Arc::new(FakeBackend::default());
        let app = app!(state_with(Some(backend.clone())));

        let req = test::TestRequest::post()
            .uri("/api/vector")
            .set_json(json!({
                "id": "doc-1",
                "text": "hello",
                "metadata": { "category": "books", "year": 2001, "sex": "female" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "success");
        assert_eq!(body["id"], "doc-1");
        assert!(body["requestId"].is_string());

        let upserts = backend.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0]["data"], "hello");
        assert!(upserts[0].get("vector").is_none());
    }

    #[actix_web::test]
    async fn test_invalid_write_lists_issues_and_skips_backend() {
        let backend = Arc::new(FakeBackend::default());
        let app = app!(state_with(Some(backend.clone())));

        let req = test::TestRequest::post()
            .uri("/api/vector")
            .set_json(json!({
                "id": "doc-1",
                "metadata": { "category": "books", "year": 1800, "sex": "female" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["issues"].as_array().unwrap().len() >= 2);
        assert!(backend.upserts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_rejected() {
        let app = app!(state_with(Some(Arc::new(FakeBackend::default()))));

        let req = test::TestRequest::post()
            .uri("/api/vector")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[actix_web::test]
    async fn test_oversized_write_body_is_structured_error() {
        let backend = Arc::new(FakeBackend::default());
        let config = AppConfig {
            max_body_bytes: 64,
            ..AppConfig::default()
        };
        let app = app!(state_with_config(Some(backend.clone()), config));

        let req = test::TestRequest::post()
            .uri("/api/vector")
            .set_json(json!({
                "id": "doc-1",
                "text": "x".repeat(200),
                "metadata": { "category": "books", "year": 2001, "sex": "female" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["requestId"].is_string());
        assert!(backend.upserts.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_write_without_backend_is_unavailable() {
        let app = app!(state_with(None));

        let req = test::TestRequest::post()
            .uri("/api/vector")
            .set_json(json!({
                "id": "doc-1",
                "vector": [0.1, 0.2],
                "metadata": { "category": "books", "year": 2001, "sex": "male" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "BACKEND_UNAVAILABLE");
    }

    #[actix_web::test]
    async fn test_query_filters_by_default_threshold() {
        let backend = Arc::new(FakeBackend::default());
        let app = app!(state_with(Some(backend.clone())));

        let req = test::TestRequest::get()
            .uri("/api/vector?text=hello&topK=5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["id"], "a");

        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries[0]["data"], "hello");
        assert_eq!(queries[0]["topK"], 5);
        assert_eq!(queries[0]["includeMetadata"], true);
    }

    #[actix_web::test]
    async fn test_vector_query_with_zero_threshold_keeps_everything() {
        let backend = Arc::new(FakeBackend::default());
        let app = app!(state_with(Some(backend.clone())));

        let req = test::TestRequest::get()
            .uri("/api/vector?query=0.1,0.2%200.3&threshold=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["matches"].as_array().unwrap().len(), 3);

        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries[0]["vector"].as_array().unwrap().len(), 3);
        assert_eq!(queries[0]["topK"], 10);
    }

    #[actix_web::test]
    async fn test_repeated_query_keys_use_first_value() {
        let backend = Arc::new(FakeBackend::default());
        let app = app!(state_with(Some(backend.clone())));

        let req = test::TestRequest::get()
            .uri("/api/vector?text=a&text=b&topK=3&topK=7")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["requestId"].is_string());

        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries[0]["data"], "a");
        assert_eq!(queries[0]["topK"], 3);
    }

    #[actix_web::test]
    async fn test_query_needs_text_or_vector() {
        let app = app!(state_with(Some(Arc::new(FakeBackend::default()))));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/vector").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "MISSING_PARAMETER");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/vector?query=abc").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_VECTOR");
    }

    #[actix_web::test]
    async fn test_missing_embedder_returns_hint() {
        let backend = Arc::new(FakeBackend {
            reject_embedding: true,
            ..FakeBackend::default()
        });
        let app = app!(state_with(Some(backend)));

        let req = test::TestRequest::get().uri("/api/vector?text=hello").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "EMBEDDER_NOT_CONFIGURED");
        assert!(body["hint"].is_string());
    }

    #[actix_web::test]
    async fn test_weather_is_cached_on_second_lookup() {
        let app = app!(state_with(None));

        let first: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/weather?city=Paris").to_request(),
        )
        .await;
        assert_eq!(first["cached"], false);
        assert_eq!(first["weather"]["location"]["name"], "Paris");

        let second: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/weather?city=Paris").to_request(),
        )
        .await;
        assert_eq!(second["cached"], true);
    }

    #[actix_web::test]
    async fn test_weather_rejects_bad_city_and_forwards_upstream_status() {
        let app = app!(state_with(None));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/weather").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_INPUT");

        let lookup: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/weather?city=Oslo&city=Rome").to_request(),
        )
        .await;
        assert_eq!(lookup["weather"]["location"]["name"], "Oslo");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/weather?city=Atlantis").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "UPSTREAM_FAILURE");
        assert_eq!(body["error"], "No matching location found.");
    }

    #[actix_web::test]
    async fn test_workflow_start_and_lookup() {
        let state = state_with(None);
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::post().uri("/api/workflow").to_request()).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body: Value = test::read_body_json(resp).await;
        let run_id = body["workflowRunId"].as_str().unwrap().to_string();

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/workflow/{}", run_id))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let run: Value = test::read_body_json(resp).await;
        assert_eq!(run["runId"], run_id.as_str());

        let runs: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/workflow").to_request(),
        )
        .await;
        assert_eq!(runs.as_array().unwrap().len(), 1);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/workflow/wfr_missing").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health_reports_integrations() {
        let app = app!(state_with(None));

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/health").to_request(),
        )
        .await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["vector"], false);
        assert_eq!(body["cache"], true);
        assert_eq!(body["weather"], true);
    }
}
