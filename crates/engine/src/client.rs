//! The job-queue contract every engine client implements.

use std::time::Duration;

use async_trait::async_trait;

use payflow_core::VariableMap;

use crate::job::ActivatedJob;

/// Worker-side view of the workflow engine's job queue.
///
/// All methods are safe for concurrent use from every poller and
/// executor task; leases are engine-granted mutual exclusion, so no
/// client-side locking is required around job state.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Lease up to `max_count` jobs of the given type, each locked
    /// exclusively for `lock_duration`.
    async fn lease_jobs(
        &self,
        job_type: &str,
        max_count: usize,
        lock_duration: Duration,
    ) -> Result<Vec<ActivatedJob>, EngineError>;

    /// Complete a job, merging the variable delta into the owning
    /// workflow instance's scope.
    async fn complete_job(&self, key: i64, variables: VariableMap) -> Result<(), EngineError>;

    /// Fail a job. `retries` is the remaining budget: a positive value
    /// re-queues the job after an engine-side backoff, zero raises an
    /// incident for manual intervention.
    async fn fail_job(&self, key: i64, error_message: &str, retries: u32)
        -> Result<(), EngineError>;

    /// Publish a message to whichever workflow instance is waiting on
    /// `(name, correlation_key)`. Resolves once the engine acknowledges
    /// delivery.
    async fn publish_message(
        &self,
        name: &str,
        correlation_key: &str,
        variables: VariableMap,
        time_to_live: Duration,
    ) -> Result<(), EngineError>;
}

/// Errors from the engine client layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("gateway error ({status}): {body}")]
    Gateway {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The engine rejected or could not serve the call.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}
