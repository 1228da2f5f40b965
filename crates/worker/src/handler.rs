//! Job types and the polymorphic handler contract.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use payflow_core::VariableMap;
use payflow_engine::{ActivatedJob, EngineError};
use payflow_events::DispatchError;

// ---------------------------------------------------------------------------
// JobType
// ---------------------------------------------------------------------------

/// Closed set of job types this worker serves.
///
/// The string tags are the task-type identifiers used in the BPMN
/// process definitions; they are part of the wire contract and must not
/// change without a coordinated process redeploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    RelaySuccess,
    RelayError,
    RelayUnknown,
    RelayPayeeSuccess,
    RelayPayeeFailure,
    InvokeAcknowledgementWorkflows,
    ValidateTransaction,
    ConsistencyCheck,
    NotifyOperator,
    NotifyAmsFailure,
}

impl JobType {
    /// Every job type, in registration order.
    pub const ALL: [JobType; 10] = [
        JobType::RelaySuccess,
        JobType::RelayError,
        JobType::RelayUnknown,
        JobType::RelayPayeeSuccess,
        JobType::RelayPayeeFailure,
        JobType::InvokeAcknowledgementWorkflows,
        JobType::ValidateTransaction,
        JobType::ConsistencyCheck,
        JobType::NotifyOperator,
        JobType::NotifyAmsFailure,
    ];

    /// The stable string tag used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::RelaySuccess => "relay-success",
            JobType::RelayError => "relay-error",
            JobType::RelayUnknown => "relay-unknown",
            JobType::RelayPayeeSuccess => "relay-payee-success",
            JobType::RelayPayeeFailure => "relay-payee-failure",
            JobType::InvokeAcknowledgementWorkflows => "invoke-acknowledgement-workflows",
            JobType::ValidateTransaction => "validate-transaction",
            JobType::ConsistencyCheck => "consistency-check",
            JobType::NotifyOperator => "notify-operator",
            JobType::NotifyAmsFailure => "notify-ams-failure",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a type tag with no registered meaning.
#[derive(Debug, thiserror::Error)]
#[error("unknown job type: {0}")]
pub struct UnknownJobType(pub String);

impl FromStr for JobType {
    type Err = UnknownJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|job_type| job_type.as_str() == s)
            .ok_or_else(|| UnknownJobType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Handler contract
// ---------------------------------------------------------------------------

/// Outcome a handler reports for one job.
#[derive(Debug)]
pub enum HandlerResult {
    /// Success; the delta is merged into the instance's variable scope.
    Complete(VariableMap),
    /// Business failure. Retryable failures consume the job's retry
    /// budget; non-retryable ones raise an incident immediately.
    Fail { message: String, retryable: bool },
}

impl HandlerResult {
    /// Success with nothing to merge.
    pub fn complete_empty() -> Self {
        Self::Complete(VariableMap::new())
    }
}

/// Infrastructure failure inside a handler, distinct from a business
/// outcome.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A structured variable did not match its schema. Retrying cannot
    /// fix malformed data, so this is reported non-retryable.
    #[error("malformed '{variable}' payload: {message}")]
    Decode {
        variable: &'static str,
        message: String,
    },

    /// A correlation message could not be delivered. The owning job
    /// fails so the engine's retry policy governs recovery.
    #[error("correlation publish failed: {0}")]
    Publish(#[from] EngineError),

    /// The event router could not accept a dispatch.
    #[error("event dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl HandlerError {
    /// Whether the engine should re-queue the job for another attempt.
    pub fn retryable(&self) -> bool {
        !matches!(self, HandlerError::Decode { .. })
    }
}

/// A unit of business logic bound to one job type.
///
/// Implementations must be idempotent under re-delivery: lease expiry
/// can cause the same job to be re-executed, so side effects outside
/// the variable delta are keyed on the job's stable identifiers.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError>;
}
