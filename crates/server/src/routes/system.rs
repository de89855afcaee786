use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Liveness plus which integrations are configured
#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        vector: state.vector.is_configured(),
        cache: state.weather.has_cache(),
        weather: state.weather_configured,
    })
}
