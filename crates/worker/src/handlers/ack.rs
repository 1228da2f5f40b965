//! Acknowledgement workflow fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use payflow_core::channel::decode_tx_id_list;
use payflow_core::{variable_names, VariableContext};
use payflow_engine::ActivatedJob;
use payflow_events::{AckWorkflowsRequested, EventBus};

use crate::handler::{HandlerError, HandlerResult, JobHandler};

/// Kicks off acknowledgement workflows for a sampled batch of
/// transactions by handing the request to the event router.
///
/// The actual workflow invocation happens in the router's subscriber;
/// the job only completes once the router has accepted the event, so a
/// routerless deployment fails the job instead of dropping the batch.
pub struct InvokeAckWorkflowsHandler {
    events: Arc<EventBus>,
}

impl InvokeAckWorkflowsHandler {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl JobHandler for InvokeAckWorkflowsHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let ctx = VariableContext::new(&job.variables);

        let transaction_ids = match ctx.get(variable_names::SAMPLED_TX_IDS) {
            // Usually a JSON string encoding the id list.
            Some(Value::String(raw)) => {
                decode_tx_id_list(raw).map_err(|e| HandlerError::Decode {
                    variable: variable_names::SAMPLED_TX_IDS,
                    message: e.to_string(),
                })?
            }
            Some(other) => {
                serde_json::from_value(other.clone()).map_err(|e| HandlerError::Decode {
                    variable: variable_names::SAMPLED_TX_IDS,
                    message: e.to_string(),
                })?
            }
            None => {
                return Err(HandlerError::Decode {
                    variable: variable_names::SAMPLED_TX_IDS,
                    message: "missing".to_string(),
                })
            }
        };

        let batch_id = ctx
            .get_str(variable_names::BATCH_ID)
            .ok_or_else(|| HandlerError::Decode {
                variable: variable_names::BATCH_ID,
                message: "missing or not a string".to_string(),
            })?
            .to_string();

        let request = AckWorkflowsRequested {
            batch_id: batch_id.clone(),
            transaction_ids,
        };
        let subscribers = self.events.dispatch(request.into_event())?;
        info!(
            job_key = job.key,
            batch_id, subscribers, "Acknowledgement workflows requested"
        );

        Ok(HandlerResult::complete_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use payflow_core::VariableMap;
    use payflow_events::ACK_WORKFLOWS_REQUESTED;
    use serde_json::json;

    fn job_with(variables: VariableMap) -> ActivatedJob {
        ActivatedJob {
            key: 300,
            job_type: "invoke-acknowledgement-workflows".to_string(),
            process_id: "ack-flow".to_string(),
            process_instance_key: 9,
            retries: 3,
            variables,
        }
    }

    fn ack_variables() -> VariableMap {
        let mut variables = VariableMap::new();
        variables.insert(
            variable_names::SAMPLED_TX_IDS.to_string(),
            json!(r#"["tx-1", "tx-2"]"#),
        );
        variables.insert(variable_names::BATCH_ID.to_string(), json!("batch-9"));
        variables
    }

    #[tokio::test]
    async fn dispatches_request_to_subscribers() {
        let events = Arc::new(EventBus::default());
        let mut receiver = events.subscribe();
        let handler = InvokeAckWorkflowsHandler::new(events);

        let result = handler.handle(&job_with(ack_variables())).await;
        assert_matches!(result, Ok(HandlerResult::Complete(delta)) if delta.is_empty());

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.event_type, ACK_WORKFLOWS_REQUESTED);
        let request = AckWorkflowsRequested::from_event(&event).unwrap();
        assert_eq!(request.batch_id, "batch-9");
        assert_eq!(request.transaction_ids, vec!["tx-1", "tx-2"]);
    }

    #[tokio::test]
    async fn accepts_id_list_as_json_array() {
        let events = Arc::new(EventBus::default());
        let _receiver = events.subscribe();
        let handler = InvokeAckWorkflowsHandler::new(events);

        let mut variables = ack_variables();
        variables.insert(
            variable_names::SAMPLED_TX_IDS.to_string(),
            json!(["tx-3", "tx-4"]),
        );
        let result = handler.handle(&job_with(variables)).await;
        assert_matches!(result, Ok(HandlerResult::Complete(_)));
    }

    #[tokio::test]
    async fn no_subscribers_fails_retryably() {
        let handler = InvokeAckWorkflowsHandler::new(Arc::new(EventBus::default()));
        let err = handler.handle(&job_with(ack_variables())).await.unwrap_err();
        assert_matches!(err, HandlerError::Dispatch(_));
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn malformed_id_list_is_a_decode_error() {
        let events = Arc::new(EventBus::default());
        let _receiver = events.subscribe();
        let handler = InvokeAckWorkflowsHandler::new(events);

        let mut variables = ack_variables();
        variables.insert(variable_names::SAMPLED_TX_IDS.to_string(), json!("oops"));
        let err = handler.handle(&job_with(variables)).await.unwrap_err();
        assert_matches!(err, HandlerError::Decode { variable, .. } => {
            assert_eq!(variable, variable_names::SAMPLED_TX_IDS);
        });
    }

    #[tokio::test]
    async fn missing_batch_id_is_a_decode_error() {
        let events = Arc::new(EventBus::default());
        let _receiver = events.subscribe();
        let handler = InvokeAckWorkflowsHandler::new(events);

        let mut variables = ack_variables();
        variables.remove(variable_names::BATCH_ID);
        let err = handler.handle(&job_with(variables)).await.unwrap_err();
        assert_matches!(err, HandlerError::Decode { variable, .. } => {
            assert_eq!(variable, variable_names::BATCH_ID);
        });
    }
}
