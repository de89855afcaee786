use actix_web::{get, post, web, HttpResponse};
use std::sync::Arc;
use tracing::info;
use vecgate_common::VecgateError;
use vecgate_workflow::spawn_demo_workflow;

use crate::error::{new_request_id, ApiError};
use crate::state::AppState;
use crate::types::WorkflowStartedResponse;

/// Start the demo workflow and return its run ID without waiting for it
#[post("/workflow")]
pub async fn start_workflow(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let request_id = new_request_id();
    let workflow_run_id =
        spawn_demo_workflow(state.workflows.clone(), state.config.workflow_sleep_secs).await;
    info!(request_id = %request_id, run_id = %workflow_run_id, "Workflow started");

    HttpResponse::Accepted().json(WorkflowStartedResponse {
        workflow_run_id,
        request_id,
    })
}

#[get("/workflow")]
pub async fn list_workflows(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(state.workflows.list().await)
}

#[get("/workflow/{run_id}")]
pub async fn get_workflow(
    run_id: web::Path<String>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    match state.workflows.get(&run_id).await {
        Some(run) => Ok(HttpResponse::Ok().json(run)),
        None => Err(ApiError::new(
            new_request_id(),
            VecgateError::not_found(format!("Workflow run not found: {}", run_id)),
        )),
    }
}
