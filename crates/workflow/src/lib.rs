//! vecgate workflow runner
//!
//! Named steps and sleeps recorded per run. Runs live in process memory only.

mod context;
mod demo;
mod registry;

pub use context::{StepContext, StepKind, StepRecord};
pub use demo::{run_demo_workflow, spawn_demo_workflow, DEMO_WORKFLOW};
pub use registry::{RunStatus, WorkflowRegistry, WorkflowRun};
