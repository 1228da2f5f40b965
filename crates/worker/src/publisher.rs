//! Correlation message publishing.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use payflow_core::VariableMap;
use payflow_engine::{EngineClient, EngineError};

/// Message name the channel-response catch events subscribe to.
pub const TRANSFER_RESPONSE_MESSAGE: &str = "transferResponse";

/// Publishes correlation messages with a fixed time-to-live.
///
/// A message only correlates while its TTL is live; the TTL gives the
/// waiting process instance a window to reach its catch event before
/// the message is discarded.
pub struct CorrelationPublisher {
    client: Arc<dyn EngineClient>,
    time_to_live: Duration,
}

impl CorrelationPublisher {
    pub fn new(client: Arc<dyn EngineClient>, time_to_live: Duration) -> Self {
        Self {
            client,
            time_to_live,
        }
    }

    /// Publishes a named message against a correlation key.
    pub async fn publish(
        &self,
        name: &str,
        correlation_key: &str,
        variables: VariableMap,
    ) -> Result<(), EngineError> {
        debug!(
            message_name = name,
            correlation_key,
            ttl_ms = self.time_to_live.as_millis() as u64,
            "publishing correlation message"
        );
        self.client
            .publish_message(name, correlation_key, variables, self.time_to_live)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payflow_engine::testing::{EngineCall, InMemoryEngine};
    use serde_json::json;

    #[tokio::test]
    async fn publishes_with_configured_ttl() {
        let engine = Arc::new(InMemoryEngine::new());
        let publisher =
            CorrelationPublisher::new(engine.clone(), Duration::from_millis(30_000));

        let mut variables = VariableMap::new();
        variables.insert("transferState".to_string(), json!("COMMITTED"));
        publisher
            .publish(TRANSFER_RESPONSE_MESSAGE, "tx-1", variables)
            .await
            .unwrap();

        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            EngineCall::Publish {
                name,
                correlation_key,
                variables,
            } => {
                assert_eq!(name, TRANSFER_RESPONSE_MESSAGE);
                assert_eq!(correlation_key, "tx-1");
                assert_eq!(variables["transferState"], json!("COMMITTED"));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }
}
