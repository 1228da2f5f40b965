//! Poll-lease-execute loop, one per registered job type.
//!
//! Each binding gets its own poller task with a semaphore that caps
//! in-flight executions. The poller only leases as many jobs as it has
//! free permits, so the engine never hands us more work than we can
//! hold. Outcomes are reported with bounded backoff; past the budget
//! the job is left to lease expiry and will be re-offered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use payflow_engine::backoff::{with_backoff, RetryConfig};
use payflow_engine::{ActivatedJob, EngineClient};

use crate::handler::HandlerResult;
use crate::registry::{JobHandlerBinding, WorkerRegistry};

/// Tunables for the dispatch loop.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Delay between lease polls for each job type.
    pub poll_interval: Duration,
    /// Exclusive lease duration requested on activation.
    pub lock_duration: Duration,
    /// Backoff applied to complete/fail reports.
    pub report_retry: RetryConfig,
    /// How long to wait for in-flight jobs when shutting down.
    pub shutdown_grace: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            lock_duration: Duration::from_secs(30),
            report_retry: RetryConfig::default(),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Drives every registered handler against the engine until cancelled.
pub struct JobDispatcher {
    client: Arc<dyn EngineClient>,
    config: DispatcherConfig,
}

impl JobDispatcher {
    pub fn new(client: Arc<dyn EngineClient>, config: DispatcherConfig) -> Self {
        Self { client, config }
    }

    /// Runs one poll loop per binding. Returns once `cancel` fires and
    /// every loop has drained (or the grace period elapsed).
    pub async fn run(&self, registry: WorkerRegistry, cancel: CancellationToken) {
        let mut pollers = Vec::new();
        for binding in registry.into_bindings() {
            let client = self.client.clone();
            let config = self.config.clone();
            let child_cancel = cancel.child_token();
            info!(
                job_type = %binding.job_type,
                max_concurrent = binding.max_concurrent,
                "Starting poll loop"
            );
            pollers.push(tokio::spawn(poll_loop(
                client,
                config,
                binding,
                child_cancel,
            )));
        }

        for poller in pollers {
            if let Err(e) = poller.await {
                error!(error = %e, "Poll loop task failed");
            }
        }
        info!("All poll loops stopped");
    }
}

async fn poll_loop(
    client: Arc<dyn EngineClient>,
    config: DispatcherConfig,
    binding: JobHandlerBinding,
    cancel: CancellationToken,
) {
    let max_concurrent = binding.max_concurrent;
    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let free = semaphore.available_permits();
        if free == 0 {
            continue;
        }

        let leased = match client
            .lease_jobs(binding.job_type.as_str(), free, config.lock_duration)
            .await
        {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(job_type = %binding.job_type, error = %e, "Lease poll failed");
                continue;
            }
        };

        for job in leased {
            // A permit is free for every leased job because we only
            // asked for as many as we had permits.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let client = client.clone();
            let binding = binding.clone();
            let report_retry = config.report_retry.clone();
            tokio::spawn(async move {
                execute_and_report(client, binding, job, report_retry).await;
                drop(permit);
            });
        }
    }

    // Drain: wait for every permit to come back, bounded by the grace
    // period. Jobs still running after that are abandoned to lease
    // expiry.
    let drained = timeout(
        config.shutdown_grace,
        semaphore.acquire_many(max_concurrent as u32),
    )
    .await;
    match drained {
        Ok(_) => info!(job_type = %binding.job_type, "Poll loop drained"),
        Err(_) => warn!(
            job_type = %binding.job_type,
            "Shutdown grace elapsed with jobs still in flight"
        ),
    }
}

async fn execute_and_report(
    client: Arc<dyn EngineClient>,
    binding: JobHandlerBinding,
    job: ActivatedJob,
    report_retry: RetryConfig,
) {
    let job_key = job.key;
    let job_type = binding.job_type;
    debug!(job_key, %job_type, retries = job.retries, "Executing job");

    // Run the handler on its own task so a panic is contained to this
    // job instead of tearing down the poller.
    let handler = binding.handler.clone();
    let handler_job = job.clone();
    let outcome = tokio::spawn(async move { handler.handle(&handler_job).await }).await;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!(job_key, %job_type, error = %e, "Handler returned an error");
            HandlerResult::Fail {
                message: e.to_string(),
                retryable: e.retryable(),
            }
        }
        Err(join_err) => {
            error!(job_key, %job_type, error = %join_err, "Handler panicked");
            HandlerResult::Fail {
                message: format!("handler panicked: {join_err}"),
                retryable: true,
            }
        }
    };

    let report = match result {
        HandlerResult::Complete(delta) => {
            with_backoff(&report_retry, || client.complete_job(job_key, delta.clone())).await
        }
        HandlerResult::Fail { message, retryable } => {
            let retries = if retryable {
                job.retries.saturating_sub(1)
            } else {
                0
            };
            with_backoff(&report_retry, || {
                client.fail_job(job_key, &message, retries)
            })
            .await
        }
    };

    if let Err(e) = report {
        // The lease will expire and the engine will re-offer the job.
        error!(
            job_key,
            %job_type,
            process_instance_key = job.process_instance_key,
            error = %e,
            "Could not report job outcome"
        );
    } else {
        debug!(job_key, %job_type, "Job outcome reported");
    }
}
