//! Transactional data validation.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use payflow_core::channel::TransactionChannelRequest;
use payflow_core::validation::validate_transaction;
use payflow_core::{variable_names, VariableContext};
use payflow_engine::ActivatedJob;

use crate::handler::{HandlerError, HandlerResult, JobHandler};

/// Error payload written when a transaction fails validation.
const INVALID_ERROR_INFORMATION: &str = "Custom Error: Transaction Invalid";
const INVALID_ERROR_DESCRIPTION: &str = "Transaction data was wrong or incomplete";

/// Validates the submitted channel request and records the verdict
/// in the `transactionValid` flag. A malformed request is a decode
/// failure, not an invalid transaction.
pub struct ValidateTransactionHandler;

#[async_trait]
impl JobHandler for ValidateTransactionHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let mut ctx = VariableContext::new(&job.variables);

        let request = decode_channel_request(ctx.get(variable_names::CHANNEL_REQUEST))?;
        let valid = validate_transaction(&request);
        info!(job_key = job.key, valid, "Transaction validated");

        ctx.set(variable_names::TRANSACTION_VALID, json!(valid));
        if !valid {
            ctx.set(
                variable_names::ERROR_INFORMATION,
                json!(INVALID_ERROR_INFORMATION),
            );
            ctx.set(
                variable_names::ERROR_DESCRIPTION,
                json!(INVALID_ERROR_DESCRIPTION),
            );
        }
        Ok(HandlerResult::Complete(ctx.into_delta()))
    }
}

fn decode_channel_request(
    value: Option<&Value>,
) -> Result<TransactionChannelRequest, HandlerError> {
    let decode_err = |message: String| HandlerError::Decode {
        variable: variable_names::CHANNEL_REQUEST,
        message,
    };
    match value {
        Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| decode_err(e.to_string())),
        Some(other) => serde_json::from_value(other.clone()).map_err(|e| decode_err(e.to_string())),
        None => Err(decode_err("missing".to_string())),
    }
}
