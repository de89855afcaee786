use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vecgate_common::{EmbedOperation, RestCredentials, Result, VecgateError};

use crate::backend::VectorBackend;
use crate::types::{Match, QueryPayload, UpsertPayload};

/// Message Upstash returns when raw data reaches an index without an embedder
pub const EMBEDDER_REJECTION: &str = "Embedding data for this index is not allowed";

/// Upstash response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<String>,
}

/// Upstash Vector REST client
#[derive(Debug, Clone)]
pub struct UpstashVectorClient {
    base_url: String,
    token: String,
    client: Client,
}

impl UpstashVectorClient {
    /// Create new Upstash Vector client
    pub fn new(credentials: &RestCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Upstash Vector client initialized: {}", credentials.url);
        Ok(Self {
            base_url: credentials.url.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            client,
        })
    }

    /// Single POST; no retries, a failure is final for the request
    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: EmbedOperation,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Sending request to Upstash Vector: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| VecgateError::backend_unavailable(format!("Failed to reach vector backend: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VecgateError::backend(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_error(status, &text, operation));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| VecgateError::backend(format!("Failed to parse response: {}", e)))?;

        match (envelope.result, envelope.error) {
            (_, Some(message)) => Err(classify_error(status, &message, operation)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(VecgateError::backend("Empty response from vector backend")),
        }
    }
}

/// Turn an error response into a typed error
pub fn classify_error(status: StatusCode, body: &str, operation: EmbedOperation) -> VecgateError {
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| body.trim().to_string());

    if message.contains(EMBEDDER_REJECTION) {
        return VecgateError::EmbedderNotConfigured(operation);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            VecgateError::backend_unavailable(format!("Vector backend rejected credentials: {}", message))
        }
        _ => VecgateError::backend(message),
    }
}

#[async_trait]
impl VectorBackend for UpstashVectorClient {
    async fn upsert(&self, payload: UpsertPayload) -> Result<()> {
        let path = match &payload {
            UpsertPayload::Vector { .. } => "upsert",
            UpsertPayload::Data { .. } => "upsert-data",
        };
        let _: String = self.post(path, &payload, EmbedOperation::Upsert).await?;
        Ok(())
    }

    async fn query(&self, payload: QueryPayload) -> Result<Vec<Match>> {
        let path = if payload.data.is_some() { "query-data" } else { "query" };
        self.post(path, &payload, EmbedOperation::Query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_rejection_is_typed() {
        let body = r#"{"error":"Embedding data for this index is not allowed. The index must be created with an embedding model to use it.","status":400}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, body, EmbedOperation::Upsert);
        assert!(matches!(
            err,
            VecgateError::EmbedderNotConfigured(EmbedOperation::Upsert)
        ));
    }

    #[test]
    fn test_plain_text_body_is_kept() {
        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded", EmbedOperation::Query);
        match err {
            VecgateError::Backend(msg) => assert_eq!(msg, "upstream exploded"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_is_unavailable() {
        let err = classify_error(StatusCode::UNAUTHORIZED, r#"{"error":"Unauthorized"}"#, EmbedOperation::Query);
        assert!(matches!(err, VecgateError::BackendUnavailable(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = UpstashVectorClient::new(&RestCredentials {
            url: "https://example-vector.upstash.io/".to_string(),
            token: "token".to_string(),
        })
        .unwrap();
        assert_eq!(client.base_url, "https://example-vector.upstash.io");
    }
}
