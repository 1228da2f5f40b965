//! Liveness probe for the poll-execute-report pipeline.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use payflow_core::{variable_names, VariableContext};
use payflow_engine::ActivatedJob;

use crate::handler::{HandlerError, HandlerResult, JobHandler};

/// Completes with a fixed marker so an operator-run probe process can
/// verify the round trip through the worker end to end.
pub struct ConsistencyCheckHandler;

#[async_trait]
impl JobHandler for ConsistencyCheckHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        info!(job_key = job.key, "Consistency probe");
        let mut ctx = VariableContext::new(&job.variables);
        ctx.set(variable_names::MESSAGE, json!("hello world"));
        Ok(HandlerResult::Complete(ctx.into_delta()))
    }
}
