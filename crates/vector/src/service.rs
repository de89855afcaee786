use std::sync::Arc;
use tracing::{error, info};
use vecgate_common::{Result, VecgateError};

use crate::backend::VectorBackend;
use crate::filter::filter_by_threshold;
use crate::params::{build_query_request, RawQueryParams};
use crate::types::{Match, QueryDefaults, QueryMode};
use crate::validate::parse_write_body;

pub const MISSING_CREDENTIALS_MESSAGE: &str = "UPSTASH Vector credentials are not configured";

/// Request normalizer in front of the similarity-search backend
#[derive(Clone)]
pub struct VectorService {
    backend: Option<Arc<dyn VectorBackend>>,
    defaults: QueryDefaults,
}

impl VectorService {
    /// Create new vector service; `None` means credentials were not configured
    pub fn new(backend: Option<Arc<dyn VectorBackend>>, defaults: QueryDefaults) -> Self {
        Self { backend, defaults }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    fn backend(&self) -> Result<&dyn VectorBackend> {
        self.backend
            .as_deref()
            .ok_or_else(|| VecgateError::backend_unavailable(MISSING_CREDENTIALS_MESSAGE))
    }

    /// Validate a raw write body and upsert it; returns the stored ID
    pub async fn write(&self, body: &[u8], request_id: &str) -> Result<String> {
        let write = parse_write_body(body).map_err(|e| {
            error!(request_id, error = %e, "write rejected");
            e
        })?;

        let backend = self.backend()?;
        let id = write.id().to_string();

        info!(
            request_id,
            id = %id,
            mode = write.mode(),
            category = %write.metadata().category,
            "upsert start"
        );

        backend.upsert(write.into_payload()).await.map_err(|e| {
            error!(request_id, id = %id, error = %e, "upsert failed");
            e
        })?;

        info!(request_id, id = %id, "upsert success");
        Ok(id)
    }

    /// Normalize read parameters, query and drop matches under the threshold
    pub async fn query(&self, params: &RawQueryParams, request_id: &str) -> Result<Vec<Match>> {
        let request = build_query_request(params, &self.defaults).map_err(|e| {
            error!(request_id, error = %e, "query rejected");
            e
        })?;

        let backend = self.backend()?;

        match &request.mode {
            QueryMode::Text(_) => info!(request_id, top_k = request.top_k.get(), "text query"),
            QueryMode::Vector(v) => {
                info!(request_id, top_k = request.top_k.get(), dim = v.len(), "vector query")
            }
        }

        let matches = backend.query(request.to_payload()).await.map_err(|e| {
            error!(request_id, error = %e, "query failed");
            e
        })?;

        let total = matches.len();
        let kept = filter_by_threshold(matches, request.threshold);
        info!(
            request_id,
            match_count = total,
            kept = kept.len(),
            threshold = request.threshold,
            "query success"
        );

        Ok(kept)
    }
}
