use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::context::StepRecord;

/// Run status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// One workflow run and what its steps produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub run_id: String,
    pub workflow: String,
    pub status: RunStatus,
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

const DEFAULT_MAX_FINISHED_RUNS: usize = 100;

/// In-memory run registry shared between handlers and running workflows
///
/// Running runs are always kept. Once more than `max_finished` runs have
/// completed or failed, the ones that finished first are dropped.
pub struct WorkflowRegistry {
    runs: Arc<RwLock<HashMap<String, WorkflowRun>>>,
    finished: Arc<Mutex<VecDeque<String>>>,
    max_finished: usize,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::with_max_finished(DEFAULT_MAX_FINISHED_RUNS)
    }
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_finished(max_finished: usize) -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            finished: Arc::new(Mutex::new(VecDeque::new())),
            max_finished,
        }
    }

    pub async fn start(&self, workflow: &str) -> String {
        let run_id = format!("wfr_{}", Uuid::new_v4().simple());
        let run = WorkflowRun {
            run_id: run_id.clone(),
            workflow: workflow.to_string(),
            status: RunStatus::Running,
            steps: Vec::new(),
            result: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        };

        self.runs.write().await.insert(run_id.clone(), run);
        run_id
    }

    pub async fn record_step(&self, run_id: &str, record: StepRecord) {
        if let Some(run) = self.runs.write().await.get_mut(run_id) {
            run.steps.push(record);
        }
    }

    /// Earlier record of a step with this name in the run
    pub async fn completed_step(&self, run_id: &str, name: &str) -> Option<StepRecord> {
        self.runs
            .read()
            .await
            .get(run_id)
            .and_then(|run| run.steps.iter().find(|s| s.name == name).cloned())
    }

    pub async fn complete(&self, run_id: &str, result: Value) {
        let mut runs = self.runs.write().await;
        let Some(run) = runs.get_mut(run_id) else {
            return;
        };
        let newly_finished = run.finished_at.is_none();
        run.status = RunStatus::Completed;
        run.result = Some(result);
        run.finished_at = Some(Utc::now());

        if newly_finished {
            self.evict_finished(&mut runs, run_id).await;
        }
    }

    pub async fn fail(&self, run_id: &str, error: String) {
        let mut runs = self.runs.write().await;
        let Some(run) = runs.get_mut(run_id) else {
            return;
        };
        let newly_finished = run.finished_at.is_none();
        run.status = RunStatus::Failed;
        run.error = Some(error);
        run.finished_at = Some(Utc::now());

        if newly_finished {
            self.evict_finished(&mut runs, run_id).await;
        }
    }

    async fn evict_finished(&self, runs: &mut HashMap<String, WorkflowRun>, run_id: &str) {
        let mut finished = self.finished.lock().await;
        finished.push_back(run_id.to_string());
        while finished.len() > self.max_finished {
            if let Some(oldest) = finished.pop_front() {
                runs.remove(&oldest);
                debug!(run_id = %oldest, "evicted finished workflow run");
            }
        }
    }

    pub async fn get(&self, run_id: &str) -> Option<WorkflowRun> {
        self.runs.read().await.get(run_id).cloned()
    }

    /// All runs, newest first
    pub async fn list(&self) -> Vec<WorkflowRun> {
        let mut runs: Vec<_> = self.runs.read().await.values().cloned().collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs
    }
}
