use actix_web::{get, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::warn;
use vecgate_cache::validate_city;
use vecgate_common::VecgateError;

use super::first_query_values;
use crate::error::{new_request_id, ApiError};
use crate::state::AppState;
use crate::types::WeatherResponse;

#[get("/weather")]
pub async fn get_weather(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let request_id = new_request_id();

    let values = first_query_values(&req, &request_id)?;
    let city = validate_city(values.get("city").map(String::as_str)).ok_or_else(|| {
        ApiError::new(
            request_id.clone(),
            VecgateError::invalid_input("Invalid or missing city parameter"),
        )
    })?;

    let lookup = state.weather.lookup(&city).await.map_err(|e| {
        warn!(request_id = %request_id, city = %city, error = %e, "Weather lookup failed");
        ApiError::new(request_id.clone(), e).with_failure_message("Failed to fetch weather data")
    })?;

    Ok(HttpResponse::Ok().json(WeatherResponse {
        weather: lookup.weather,
        cached: lookup.cached,
        request_id,
    }))
}
