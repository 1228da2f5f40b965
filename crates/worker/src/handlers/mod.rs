//! Handlers for every job type served by this worker.

mod ack;
mod consistency;
mod payee;
mod relay;
mod validate;

pub use ack::InvokeAckWorkflowsHandler;
pub use consistency::ConsistencyCheckHandler;
pub use payee::{RelayPayeeFailureHandler, RelayPayeeSuccessHandler};
pub use relay::{RelayErrorHandler, RelaySuccessHandler, RelayUnknownHandler};
pub use validate::ValidateTransactionHandler;

use std::sync::Arc;

use payflow_events::EventBus;

use crate::handler::JobType;
use crate::publisher::CorrelationPublisher;
use crate::registry::{RegistryError, WorkerRegistry};

/// Registers every handler with the same per-type concurrency bound.
pub fn register_all(
    registry: &mut WorkerRegistry,
    publisher: Arc<CorrelationPublisher>,
    events: Arc<EventBus>,
    max_concurrent: usize,
) -> Result<(), RegistryError> {
    registry.register(
        JobType::RelaySuccess,
        Arc::new(RelaySuccessHandler),
        max_concurrent,
    )?;
    registry.register(
        JobType::RelayError,
        Arc::new(RelayErrorHandler),
        max_concurrent,
    )?;
    registry.register(
        JobType::RelayUnknown,
        Arc::new(RelayUnknownHandler),
        max_concurrent,
    )?;
    registry.register(
        JobType::RelayPayeeSuccess,
        Arc::new(RelayPayeeSuccessHandler::new(publisher.clone())),
        max_concurrent,
    )?;
    registry.register(
        JobType::RelayPayeeFailure,
        Arc::new(RelayPayeeFailureHandler::new(publisher)),
        max_concurrent,
    )?;
    registry.register(
        JobType::InvokeAcknowledgementWorkflows,
        Arc::new(InvokeAckWorkflowsHandler::new(events)),
        max_concurrent,
    )?;
    registry.register(
        JobType::ValidateTransaction,
        Arc::new(ValidateTransactionHandler),
        max_concurrent,
    )?;
    registry.register(
        JobType::ConsistencyCheck,
        Arc::new(ConsistencyCheckHandler),
        max_concurrent,
    )?;
    registry.register(
        JobType::NotifyOperator,
        Arc::new(RelaySuccessHandler),
        max_concurrent,
    )?;
    registry.register(
        JobType::NotifyAmsFailure,
        Arc::new(RelaySuccessHandler),
        max_concurrent,
    )?;
    Ok(())
}
