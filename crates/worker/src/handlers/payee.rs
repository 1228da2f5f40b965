//! Payee-side outcome relays.
//!
//! Both handlers publish a `transferResponse` correlation message so
//! the channel-facing process instance waiting on the transaction id
//! can resume, then complete their own job. The message goes out first;
//! if publishing fails the job fails too and the outcome is re-driven
//! on retry.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use payflow_core::{variable_names, VariableContext};
use payflow_engine::ActivatedJob;

use crate::handler::{HandlerError, HandlerResult, JobHandler};
use crate::publisher::{CorrelationPublisher, TRANSFER_RESPONSE_MESSAGE};

/// Relays a payee-side deposit that could not be applied.
pub struct RelayPayeeSuccessHandler {
    publisher: Arc<CorrelationPublisher>,
}

impl RelayPayeeSuccessHandler {
    pub fn new(publisher: Arc<CorrelationPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl JobHandler for RelayPayeeSuccessHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let mut ctx = VariableContext::new(&job.variables);
        ctx.set(
            variable_names::ERROR_INFORMATION,
            json!("Custom Error: Failed to deposit!"),
        );
        ctx.set(variable_names::TRANSFER_FAILED, json!(true));
        correlate(&self.publisher, job, ctx).await
    }
}

/// Relays a payee-side transfer that committed.
pub struct RelayPayeeFailureHandler {
    publisher: Arc<CorrelationPublisher>,
}

impl RelayPayeeFailureHandler {
    pub fn new(publisher: Arc<CorrelationPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl JobHandler for RelayPayeeFailureHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let mut ctx = VariableContext::new(&job.variables);
        ctx.set(variable_names::TRANSFER_STATE, json!("COMMITTED"));
        ctx.set(variable_names::TRANSFER_FAILED, json!(false));
        correlate(&self.publisher, job, ctx).await
    }
}

/// Publish the full variable scope against the transaction id, then
/// hand back only this lease's writes as the completion delta.
async fn correlate(
    publisher: &CorrelationPublisher,
    job: &ActivatedJob,
    ctx: VariableContext<'_>,
) -> Result<HandlerResult, HandlerError> {
    let correlation_key = ctx
        .get_str(variable_names::TRANSACTION_ID)
        .ok_or_else(|| HandlerError::Decode {
            variable: variable_names::TRANSACTION_ID,
            message: "missing or not a string".to_string(),
        })?
        .to_string();

    publisher
        .publish(TRANSFER_RESPONSE_MESSAGE, &correlation_key, ctx.merged())
        .await?;
    info!(job_key = job.key, %correlation_key, "Transfer response correlated");

    Ok(HandlerResult::Complete(ctx.into_delta()))
}
