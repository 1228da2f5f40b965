//! Handler registration table.

use std::collections::HashSet;
use std::sync::Arc;

use crate::handler::{JobHandler, JobType};

/// One registered handler with its concurrency bound.
#[derive(Clone)]
pub struct JobHandlerBinding {
    pub job_type: JobType,
    pub handler: Arc<dyn JobHandler>,
    pub max_concurrent: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("handler already registered for job type '{0}'")]
    Duplicate(JobType),
    #[error("max_concurrent must be at least 1 for job type '{0}'")]
    ZeroConcurrency(JobType),
}

/// Maps job types to handlers before the dispatcher starts.
///
/// Registration is a startup-time activity; the table is immutable once
/// handed to the dispatcher.
#[derive(Default)]
pub struct WorkerRegistry {
    bindings: Vec<JobHandlerBinding>,
    registered: HashSet<JobType>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a handler to a job type with an upper bound on in-flight
    /// executions of that type.
    pub fn register(
        &mut self,
        job_type: JobType,
        handler: Arc<dyn JobHandler>,
        max_concurrent: usize,
    ) -> Result<(), RegistryError> {
        if max_concurrent == 0 {
            return Err(RegistryError::ZeroConcurrency(job_type));
        }
        if !self.registered.insert(job_type) {
            return Err(RegistryError::Duplicate(job_type));
        }
        self.bindings.push(JobHandlerBinding {
            job_type,
            handler,
            max_concurrent,
        });
        Ok(())
    }

    pub fn bindings(&self) -> &[JobHandlerBinding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<JobHandlerBinding> {
        self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
