use serde::Serialize;
use vecgate_vector::Match;

/// Successful write
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    pub message: &'static str,
    pub id: String,
    pub request_id: String,
}

/// Matches that passed the threshold
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub matches: Vec<Match>,
    pub request_id: String,
}

/// Weather lookup result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub weather: serde_json::Value,
    pub cached: bool,
    pub request_id: String,
}

/// Workflow run accepted
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStartedResponse {
    pub workflow_run_id: String,
    pub request_id: String,
}

/// Which integrations are configured
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub vector: bool,
    pub cache: bool,
    pub weather: bool,
}
