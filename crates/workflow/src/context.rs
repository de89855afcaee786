use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use vecgate_common::Result;

use crate::registry::WorkflowRegistry;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Run,
    Sleep,
}

/// Completed step of a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub completed_at: DateTime<Utc>,
}

/// Handle a workflow body uses to register its steps
#[derive(Clone)]
pub struct StepContext {
    run_id: String,
    registry: Arc<WorkflowRegistry>,
}

impl StepContext {
    pub fn new(run_id: impl Into<String>, registry: Arc<WorkflowRegistry>) -> Self {
        Self {
            run_id: run_id.into(),
            registry,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Run a named step once; a name already completed in this run replays its output
    pub async fn run_step<T, F, Fut>(&self, name: &str, step: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(record) = self.registry.completed_step(&self.run_id, name).await {
            debug!(run_id = %self.run_id, step = name, "replaying completed step");
            let output = record.output.unwrap_or(Value::Null);
            return Ok(serde_json::from_value(output)?);
        }

        info!(run_id = %self.run_id, step = name, "step started");
        let output = step().await?;

        self.registry
            .record_step(
                &self.run_id,
                StepRecord {
                    name: name.to_string(),
                    kind: StepKind::Run,
                    output: Some(serde_json::to_value(&output)?),
                    completed_at: Utc::now(),
                },
            )
            .await;
        info!(run_id = %self.run_id, step = name, "step completed");

        Ok(output)
    }

    /// Named sleep; skipped when the name already completed in this run
    pub async fn sleep(&self, name: &str, secs: u64) {
        if self.registry.completed_step(&self.run_id, name).await.is_some() {
            return;
        }

        info!(run_id = %self.run_id, step = name, secs, "sleeping");
        tokio::time::sleep(Duration::from_secs(secs)).await;

        self.registry
            .record_step(
                &self.run_id,
                StepRecord {
                    name: name.to_string(),
                    kind: StepKind::Sleep,
                    output: None,
                    completed_at: Utc::now(),
                },
            )
            .await;
    }
}
