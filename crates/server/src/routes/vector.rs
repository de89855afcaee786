use actix_web::{get, post, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::{info, warn};
use vecgate_common::VecgateError;
use vecgate_vector::RawQueryParams;

use super::first_query_values;
use crate::error::{new_request_id, ApiError};
use crate::state::AppState;
use crate::types::{QueryResponse, WriteResponse};

/// Store one text or vector record
#[post("/vector")]
pub async fn upsert_vector(
    payload: web::Payload,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let request_id = new_request_id();
    let limit = state.config.max_body_bytes;

    let body = match payload.to_bytes_limited(limit).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            return Err(ApiError::new(
                request_id,
                VecgateError::malformed_input(format!("failed to read body: {}", e)),
            ))
        }
        Err(_) => {
            warn!(request_id = %request_id, limit, "Vector write body too large");
            return Err(ApiError::new(request_id, VecgateError::PayloadTooLarge(limit)));
        }
    };
    info!(request_id = %request_id, bytes = body.len(), "Vector write received");

    let id = state.vector.write(&body, &request_id).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Vector write rejected");
        ApiError::new(request_id.clone(), e).with_failure_message("failed to upsert")
    })?;

    Ok(HttpResponse::Ok().json(WriteResponse {
        message: "success",
        id,
        request_id,
    }))
}

/// Similarity search by text or by vector
#[get("/vector")]
pub async fn query_vector(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let request_id = new_request_id();

    let mut values = first_query_values(&req, &request_id)?;
    let params = RawQueryParams {
        text: values.remove("text"),
        query: values.remove("query"),
        top_k: values.remove("topK"),
        threshold: values.remove("threshold"),
    };

    let matches = state.vector.query(&params, &request_id).await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Vector query rejected");
        ApiError::new(request_id.clone(), e).with_failure_message("failed to query")
    })?;

    Ok(HttpResponse::Ok().json(QueryResponse { matches, request_id }))
}
