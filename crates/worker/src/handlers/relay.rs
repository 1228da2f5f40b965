//! Channel relay handlers for terminal transfer outcomes.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use payflow_core::channel::ErrorInformationWrapper;
use payflow_core::error_codes::{ErrorCategory, TransferErrorCode};
use payflow_core::{variable_names, VariableContext};
use payflow_engine::ActivatedJob;

use crate::handler::{HandlerError, HandlerResult, JobHandler};

/// Acknowledges a job without touching any variables.
///
/// The channel callback itself happens elsewhere; this worker's part is
/// only to move the process past the service task.
pub struct RelaySuccessHandler;

#[async_trait]
impl JobHandler for RelaySuccessHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        info!(job_key = job.key, process_id = %job.process_id, "Acknowledged");
        Ok(HandlerResult::complete_empty())
    }
}

/// Relays a downstream failure to the channel.
///
/// Clears the transfer-create flag and, when a structured error payload
/// is present, logs which error-code table entry it maps to.
pub struct RelayErrorHandler;

#[async_trait]
impl JobHandler for RelayErrorHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let mut ctx = VariableContext::new(&job.variables);

        if let Some(raw) = ctx.get(variable_names::ERROR_INFORMATION).cloned() {
            let wrapper = decode_error_information(&raw)?;
            log_error_code(job, &wrapper);
        } else {
            warn!(job_key = job.key, "Error relay without an error payload");
        }

        ctx.set(variable_names::TRANSFER_CREATE_FAILED, json!(false));
        Ok(HandlerResult::Complete(ctx.into_delta()))
    }
}

fn decode_error_information(value: &Value) -> Result<ErrorInformationWrapper, HandlerError> {
    let decoded = match value {
        // The variable often arrives double-encoded as a JSON string.
        Value::String(raw) => serde_json::from_str(raw),
        other => serde_json::from_value(other.clone()),
    };
    decoded.map_err(|e| HandlerError::Decode {
        variable: variable_names::ERROR_INFORMATION,
        message: e.to_string(),
    })
}

fn log_error_code(job: &ActivatedJob, wrapper: &ErrorInformationWrapper) {
    let info = &wrapper.error_information;
    match info.error_code.parse::<u16>() {
        Ok(code) => match TransferErrorCode::from_code(code) {
            Some(known) => info!(
                job_key = job.key,
                error_code = code,
                error_name = known.name(),
                category = %known.category(),
                description = %info.error_description,
                "Relaying transfer error"
            ),
            None => warn!(
                job_key = job.key,
                error_code = code,
                category = %ErrorCategory::from_code(code),
                description = %info.error_description,
                "Relaying unrecognized transfer error code"
            ),
        },
        Err(_) => warn!(
            job_key = job.key,
            error_code = %info.error_code,
            description = %info.error_description,
            "Transfer error code is not numeric"
        ),
    }
}

/// Response retries the channel is told were exhausted before the
/// transfer landed in the unknown state.
const RESPONSE_RETRY_BUDGET: u32 = 3;

/// Relays a transfer whose terminal state never became known.
///
/// Dumps the full variable scope for the operator, since an unknown
/// outcome usually means manual reconciliation.
pub struct RelayUnknownHandler;

#[async_trait]
impl JobHandler for RelayUnknownHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let ctx = VariableContext::new(&job.variables);
        for (name, value) in ctx.sorted_entries() {
            warn!(job_key = job.key, variable = name, value = %value, "Unknown-state variable");
        }
        warn!(
            job_key = job.key,
            transaction_id = ctx.get_str(variable_names::TRANSACTION_ID).unwrap_or("<unset>"),
            response_retries = RESPONSE_RETRY_BUDGET,
            "Transfer finished in an unknown state"
        );
        Ok(HandlerResult::complete_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use payflow_core::VariableMap;

    fn job_with(variables: VariableMap) -> ActivatedJob {
        ActivatedJob {
            key: 100,
            job_type: "relay-error".to_string(),
            process_id: "transfer-flow".to_string(),
            process_instance_key: 7,
            retries: 3,
            variables,
        }
    }

    #[tokio::test]
    async fn success_relay_completes_with_empty_delta() {
        let result = RelaySuccessHandler.handle(&job_with(VariableMap::new())).await;
        assert_matches!(result, Ok(HandlerResult::Complete(delta)) if delta.is_empty());
    }

    #[tokio::test]
    async fn error_relay_clears_transfer_create_flag() {
        let mut variables = VariableMap::new();
        variables.insert(
            variable_names::ERROR_INFORMATION.to_string(),
            json!({"errorInformation": {"errorCode": "5001", "errorDescription": "no funds"}}),
        );
        let result = RelayErrorHandler.handle(&job_with(variables)).await.unwrap();
        assert_matches!(result, HandlerResult::Complete(delta) => {
            assert_eq!(delta.len(), 1);
            assert_eq!(delta[variable_names::TRANSFER_CREATE_FAILED], json!(false));
        });
    }

    #[tokio::test]
    async fn error_relay_accepts_string_encoded_payload() {
        let mut variables = VariableMap::new();
        variables.insert(
            variable_names::ERROR_INFORMATION.to_string(),
            json!(r#"{"errorInformation": {"errorCode": "2001", "errorDescription": "down"}}"#),
        );
        let result = RelayErrorHandler.handle(&job_with(variables)).await;
        assert_matches!(result, Ok(HandlerResult::Complete(_)));
    }

    #[tokio::test]
    async fn error_relay_without_payload_still_completes() {
        let result = RelayErrorHandler.handle(&job_with(VariableMap::new())).await.unwrap();
        assert_matches!(result, HandlerResult::Complete(delta) => {
            assert_eq!(delta[variable_names::TRANSFER_CREATE_FAILED], json!(false));
        });
    }

    #[tokio::test]
    async fn malformed_error_payload_is_a_decode_error() {
        let mut variables = VariableMap::new();
        variables.insert(
            variable_names::ERROR_INFORMATION.to_string(),
            json!("not json at all"),
        );
        let err = RelayErrorHandler.handle(&job_with(variables)).await.unwrap_err();
        assert_matches!(err, HandlerError::Decode { variable, .. } => {
            assert_eq!(variable, variable_names::ERROR_INFORMATION);
        });
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn unknown_relay_completes_with_empty_delta() {
        let mut variables = VariableMap::new();
        variables.insert("transactionId".to_string(), json!("tx-1"));
        let result = RelayUnknownHandler.handle(&job_with(variables)).await;
        assert_matches!(result, Ok(HandlerResult::Complete(delta)) if delta.is_empty());
    }
}
