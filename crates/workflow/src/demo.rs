use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use vecgate_common::Result;

use crate::context::StepContext;
use crate::registry::WorkflowRegistry;

pub const DEMO_WORKFLOW: &str = "demo";

/// Three recorded steps with a named sleep between the first two
pub async fn run_demo_workflow(ctx: &StepContext, sleep_secs: u64) -> Result<Value> {
    let result1: Value = ctx
        .run_step("initial-step", || async {
            Ok(json!({
                "message": "Step 1 completed",
                "timestamp": Utc::now().to_rfc3339(),
            }))
        })
        .await?;

    ctx.sleep(&format!("wait-{}-seconds", sleep_secs), sleep_secs)
        .await;

    let previous = result1.clone();
    let result2: Value = ctx
        .run_step("data-processing", move || async move {
            Ok(json!({
                "message": "Step 2 completed after waiting",
                "previousResult": previous,
                "timestamp": Utc::now().to_rfc3339(),
            }))
        })
        .await?;

    ctx.run_step("final-step", move || async move {
        Ok(json!({
            "message": "Workflow completed successfully",
            "allResults": { "result1": result1, "result2": result2 },
            "completedAt": Utc::now().to_rfc3339(),
        }))
    })
    .await
}

/// Start the demo workflow on a background task; returns the run ID at once
pub async fn spawn_demo_workflow(registry: Arc<WorkflowRegistry>, sleep_secs: u64) -> String {
    let run_id = registry.start(DEMO_WORKFLOW).await;
    let ctx = StepContext::new(run_id.clone(), registry.clone());

    tokio::spawn(async move {
        match run_demo_workflow(&ctx, sleep_secs).await {
            Ok(result) => {
                info!(run_id = ctx.run_id(), "workflow completed");
                registry.complete(ctx.run_id(), result).await;
            }
            Err(e) => {
                error!(run_id = ctx.run_id(), error = %e, "workflow failed");
                registry.fail(ctx.run_id(), e.to_string()).await;
            }
        }
    });

    run_id
}
