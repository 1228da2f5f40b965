//! In-memory engine test double.
//!
//! [`InMemoryEngine`] implements [`EngineClient`] against queues held in
//! process memory. Every effectful call (complete, fail, publish) is
//! recorded in one ordered log so tests can assert not just what was
//! called but in which order -- e.g. that a correlation message was
//! published strictly before its job was completed. Transient failures
//! can be injected per call kind.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use payflow_core::VariableMap;

use crate::client::{EngineClient, EngineError};
use crate::job::ActivatedJob;

/// One recorded effectful call. Lease calls are not recorded -- poll
/// loops produce unbounded amounts of them.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Complete {
        key: i64,
        variables: VariableMap,
    },
    Fail {
        key: i64,
        error_message: String,
        retries: u32,
    },
    Publish {
        name: String,
        correlation_key: String,
        variables: VariableMap,
    },
}

#[derive(Default)]
struct EngineState {
    queues: HashMap<String, VecDeque<ActivatedJob>>,
    calls: Vec<EngineCall>,
    fail_next_completes: u32,
    fail_next_publishes: u32,
}

/// In-memory [`EngineClient`] implementation for tests.
#[derive(Default)]
pub struct InMemoryEngine {
    state: Mutex<EngineState>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job for leasing.
    pub fn enqueue(&self, job: ActivatedJob) {
        let mut state = self.state.lock().unwrap();
        state
            .queues
            .entry(job.job_type.clone())
            .or_default()
            .push_back(job);
    }

    /// Inject failures into the next `n` complete calls.
    pub fn fail_next_completes(&self, n: u32) {
        self.state.lock().unwrap().fail_next_completes = n;
    }

    /// Inject failures into the next `n` publish calls.
    pub fn fail_next_publishes(&self, n: u32) {
        self.state.lock().unwrap().fail_next_publishes = n;
    }

    /// Snapshot of all recorded effectful calls, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Keys of all completed jobs, in completion order.
    pub fn completed_keys(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Complete { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    /// All recorded fail calls as `(key, error_message, retries)`.
    pub fn failed(&self) -> Vec<(i64, String, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Fail {
                    key,
                    error_message,
                    retries,
                } => Some((key, error_message, retries)),
                _ => None,
            })
            .collect()
    }

    /// All recorded publish calls as `(name, correlation_key, variables)`.
    pub fn published(&self) -> Vec<(String, String, VariableMap)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Publish {
                    name,
                    correlation_key,
                    variables,
                } => Some((name, correlation_key, variables)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EngineClient for InMemoryEngine {
    async fn lease_jobs(
        &self,
        job_type: &str,
        max_count: usize,
        _lock_duration: Duration,
    ) -> Result<Vec<ActivatedJob>, EngineError> {
        let mut state = self.state.lock().unwrap();
        let Some(queue) = state.queues.get_mut(job_type) else {
            return Ok(Vec::new());
        };
        let count = max_count.min(queue.len());
        Ok(queue.drain(..count).collect())
    }

    async fn complete_job(&self, key: i64, variables: VariableMap) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_completes > 0 {
            state.fail_next_completes -= 1;
            return Err(EngineError::Unavailable("injected complete failure".into()));
        }
        state.calls.push(EngineCall::Complete { key, variables });
        Ok(())
    }

    async fn fail_job(
        &self,
        key: i64,
        error_message: &str,
        retries: u32,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Fail {
            key,
            error_message: error_message.to_string(),
            retries,
        });
        Ok(())
    }

    async fn publish_message(
        &self,
        name: &str,
        correlation_key: &str,
        variables: VariableMap,
        _time_to_live: Duration,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_publishes > 0 {
            state.fail_next_publishes -= 1;
            return Err(EngineError::Unavailable("injected publish failure".into()));
        }
        state.calls.push(EngineCall::Publish {
            name: name.to_string(),
            correlation_key: correlation_key.to_string(),
            variables,
        });
        Ok(())
    }
}
