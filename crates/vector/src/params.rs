use serde::Deserialize;
use vecgate_common::{Result, VecgateError};

use crate::types::{QueryDefaults, QueryMode, QueryRequest, TopK};

pub const MISSING_QUERY_MESSAGE: &str = "either 'text' or 'query' parameter is required";

/// Raw query-string parameters of a read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQueryParams {
    /// Text to embed and search with
    pub text: Option<String>,

    /// Whitespace/comma separated numbers
    pub query: Option<String>,

    #[serde(rename = "topK")]
    pub top_k: Option<String>,

    pub threshold: Option<String>,
}

/// Numeric value of a raw parameter; blank counts as missing
fn parse_number(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// topK: default when missing, non-finite or not positive, capped at the maximum
pub fn parse_top_k(raw: Option<&str>, defaults: &QueryDefaults) -> TopK {
    match parse_number(raw) {
        Some(n) if n.is_finite() && n > 0.0 => TopK::new(n.clamp(1.0, defaults.max_top_k)),
        _ => TopK::new(defaults.top_k),
    }
}

/// threshold: default when missing or non-finite, clamped to [0, 1]
pub fn parse_threshold(raw: Option<&str>, defaults: &QueryDefaults) -> f64 {
    match parse_number(raw) {
        Some(n) if n.is_finite() => n.clamp(0.0, 1.0),
        _ => defaults.threshold,
    }
}

/// Split on runs of whitespace and commas, keeping only finite numbers
pub fn parse_vector_param(raw: &str) -> Vec<f32> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .map(|n| n as f32)
        .filter(|n| n.is_finite())
        .collect()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Resolve raw parameters into one normalized read
pub fn build_query_request(params: &RawQueryParams, defaults: &QueryDefaults) -> Result<QueryRequest> {
    let top_k = parse_top_k(params.top_k.as_deref(), defaults);
    let threshold = parse_threshold(params.threshold.as_deref(), defaults);

    let mode = if let Some(text) = non_blank(params.text.as_deref()) {
        QueryMode::Text(text.to_string())
    } else if let Some(raw) = non_blank(params.query.as_deref()) {
        let vector = parse_vector_param(raw);
        if vector.is_empty() {
            return Err(VecgateError::invalid_vector(format!(
                "no finite numbers in '{}'",
                raw
            )));
        }
        QueryMode::Vector(vector)
    } else {
        return Err(VecgateError::missing_parameter(MISSING_QUERY_MESSAGE));
    };

    Ok(QueryRequest {
        mode,
        top_k,
        threshold,
    })
}
