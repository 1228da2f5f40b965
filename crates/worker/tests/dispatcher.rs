//! End-to-end dispatcher tests against the in-memory engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use payflow_core::{variable_names, VariableMap};
use payflow_engine::backoff::RetryConfig;
use payflow_engine::testing::{EngineCall, InMemoryEngine};
use payflow_engine::ActivatedJob;
use payflow_worker::dispatcher::{DispatcherConfig, JobDispatcher};
use payflow_worker::handler::{HandlerError, HandlerResult, JobHandler, JobType};
use payflow_worker::handlers::{RelayPayeeFailureHandler, ValidateTransactionHandler};
use payflow_worker::publisher::CorrelationPublisher;
use payflow_worker::registry::WorkerRegistry;

fn test_config() -> DispatcherConfig {
    DispatcherConfig {
        poll_interval: Duration::from_millis(10),
        lock_duration: Duration::from_secs(30),
        report_retry: RetryConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            multiplier: 2.0,
            max_attempts: 3,
        },
        shutdown_grace: Duration::from_secs(2),
    }
}

fn job(key: i64, job_type: JobType, variables: VariableMap) -> ActivatedJob {
    ActivatedJob {
        key,
        job_type: job_type.as_str().to_string(),
        process_id: "test-flow".to_string(),
        process_instance_key: 1000 + key,
        retries: 3,
        variables,
    }
}

/// Run the dispatcher in the background until `done` reports true, then
/// cancel and wait for the drain.
async fn drive<F>(engine: Arc<InMemoryEngine>, registry: WorkerRegistry, done: F)
where
    F: Fn() -> bool,
{
    let cancel = CancellationToken::new();
    let dispatcher = JobDispatcher::new(engine, test_config());
    let task_cancel = cancel.clone();
    let task = tokio::spawn(async move { dispatcher.run(registry, task_cancel).await });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "dispatcher did not reach the expected state in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    cancel.cancel();
    task.await.unwrap();
}

// ---------------------------------------------------------------------------
// Concurrency bound
// ---------------------------------------------------------------------------

struct SlowHandler {
    in_flight: Arc<AtomicUsize>,
    max_seen: Arc<AtomicUsize>,
}

#[async_trait]
impl JobHandler for SlowHandler {
    async fn handle(&self, _job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(HandlerResult::complete_empty())
    }
}

#[tokio::test]
async fn in_flight_jobs_never_exceed_the_type_bound() {
    let engine = Arc::new(InMemoryEngine::new());
    for key in 1..=6 {
        engine.enqueue(job(key, JobType::RelaySuccess, VariableMap::new()));
    }

    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let mut registry = WorkerRegistry::new();
    registry
        .register(
            JobType::RelaySuccess,
            Arc::new(SlowHandler {
                in_flight: in_flight.clone(),
                max_seen: max_seen.clone(),
            }),
            2,
        )
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        done_engine.completed_keys().len() == 6
    })
    .await;

    assert!(
        max_seen.load(Ordering::SeqCst) <= 2,
        "saw {} concurrent executions with a bound of 2",
        max_seen.load(Ordering::SeqCst)
    );
    let mut completed = engine.completed_keys();
    completed.sort_unstable();
    assert_eq!(completed, vec![1, 2, 3, 4, 5, 6]);
}

// ---------------------------------------------------------------------------
// Message-before-completion ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn correlation_message_is_published_before_completion() {
    let engine = Arc::new(InMemoryEngine::new());
    let mut variables = VariableMap::new();
    variables.insert(variable_names::TRANSACTION_ID.to_string(), json!("tx-77"));
    engine.enqueue(job(10, JobType::RelayPayeeFailure, variables));

    let publisher = Arc::new(CorrelationPublisher::new(
        engine.clone(),
        Duration::from_millis(30_000),
    ));
    let mut registry = WorkerRegistry::new();
    registry
        .register(
            JobType::RelayPayeeFailure,
            Arc::new(RelayPayeeFailureHandler::new(publisher)),
            4,
        )
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        !done_engine.completed_keys().is_empty()
    })
    .await;

    let calls = engine.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], EngineCall::Publish { correlation_key, .. } if correlation_key == "tx-77"));
    assert!(matches!(&calls[1], EngineCall::Complete { key: 10, .. }));
}

// ---------------------------------------------------------------------------
// Failure reporting
// ---------------------------------------------------------------------------

struct PanickingHandler;

#[async_trait]
impl JobHandler for PanickingHandler {
    async fn handle(&self, _job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        panic!("boom");
    }
}

#[tokio::test]
async fn handler_panic_fails_the_job_with_one_retry_consumed() {
    let engine = Arc::new(InMemoryEngine::new());
    engine.enqueue(job(20, JobType::ConsistencyCheck, VariableMap::new()));

    let mut registry = WorkerRegistry::new();
    registry
        .register(JobType::ConsistencyCheck, Arc::new(PanickingHandler), 4)
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        !done_engine.failed().is_empty()
    })
    .await;

    let failed = engine.failed();
    assert_eq!(failed.len(), 1);
    let (key, message, retries) = &failed[0];
    assert_eq!(*key, 20);
    assert!(message.contains("panicked"));
    // The job arrived with 3 retries; a retryable failure consumes one.
    assert_eq!(*retries, 2);
}

#[tokio::test]
async fn malformed_payload_fails_without_retries() {
    let engine = Arc::new(InMemoryEngine::new());
    let mut variables = VariableMap::new();
    variables.insert(variable_names::CHANNEL_REQUEST.to_string(), json!("{oops"));
    engine.enqueue(job(30, JobType::ValidateTransaction, variables));

    let mut registry = WorkerRegistry::new();
    registry
        .register(
            JobType::ValidateTransaction,
            Arc::new(ValidateTransactionHandler),
            4,
        )
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        !done_engine.failed().is_empty()
    })
    .await;

    let failed = engine.failed();
    assert_eq!(failed.len(), 1);
    let (key, _message, retries) = &failed[0];
    assert_eq!(*key, 30);
    // Malformed data cannot be fixed by retrying.
    assert_eq!(*retries, 0);
}

#[tokio::test]
async fn publish_failure_fails_the_job_retryably() {
    let engine = Arc::new(InMemoryEngine::new());
    engine.fail_next_publishes(1);
    let mut variables = VariableMap::new();
    variables.insert(variable_names::TRANSACTION_ID.to_string(), json!("tx-88"));
    engine.enqueue(job(40, JobType::RelayPayeeFailure, variables));

    let publisher = Arc::new(CorrelationPublisher::new(
        engine.clone(),
        Duration::from_millis(30_000),
    ));
    let mut registry = WorkerRegistry::new();
    registry
        .register(
            JobType::RelayPayeeFailure,
            Arc::new(RelayPayeeFailureHandler::new(publisher)),
            4,
        )
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        !done_engine.failed().is_empty()
    })
    .await;

    let failed = engine.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].2, 2);
    assert!(engine.completed_keys().is_empty());
}

// ---------------------------------------------------------------------------
// Completion delta
// ---------------------------------------------------------------------------

struct DeltaHandler;

#[async_trait]
impl JobHandler for DeltaHandler {
    async fn handle(&self, job: &ActivatedJob) -> Result<HandlerResult, HandlerError> {
        let mut ctx = payflow_core::VariableContext::new(&job.variables);
        ctx.set("verdict", json!("ok"));
        Ok(HandlerResult::Complete(ctx.into_delta()))
    }
}

#[tokio::test]
async fn completion_carries_only_the_handler_delta() {
    let engine = Arc::new(InMemoryEngine::new());
    let mut variables = VariableMap::new();
    variables.insert("existing".to_string(), json!("untouched"));
    engine.enqueue(job(50, JobType::RelaySuccess, variables));

    let mut registry = WorkerRegistry::new();
    registry
        .register(JobType::RelaySuccess, Arc::new(DeltaHandler), 4)
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        !done_engine.completed_keys().is_empty()
    })
    .await;

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        EngineCall::Complete { key, variables } => {
            assert_eq!(*key, 50);
            assert_eq!(variables.len(), 1);
            assert_eq!(variables["verdict"], json!("ok"));
            assert!(!variables.contains_key("existing"));
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Report retries and shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completion_report_retries_through_transient_gateway_errors() {
    let engine = Arc::new(InMemoryEngine::new());
    engine.fail_next_completes(2);
    engine.enqueue(job(60, JobType::RelaySuccess, VariableMap::new()));

    let mut registry = WorkerRegistry::new();
    registry
        .register(JobType::RelaySuccess, Arc::new(DeltaHandler), 4)
        .unwrap();

    let done_engine = engine.clone();
    drive(engine.clone(), registry, move || {
        !done_engine.completed_keys().is_empty()
    })
    .await;

    assert_eq!(engine.completed_keys(), vec![60]);
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_jobs() {
    let engine = Arc::new(InMemoryEngine::new());
    engine.enqueue(job(70, JobType::RelaySuccess, VariableMap::new()));

    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let started = in_flight.clone();
    let mut registry = WorkerRegistry::new();
    registry
        .register(
            JobType::RelaySuccess,
            Arc::new(SlowHandler {
                in_flight,
                max_seen,
            }),
            4,
        )
        .unwrap();

    let cancel = CancellationToken::new();
    let dispatcher = JobDispatcher::new(engine.clone(), test_config());
    let task_cancel = cancel.clone();
    let task = tokio::spawn(async move { dispatcher.run(registry, task_cancel).await });

    // Cancel as soon as the job is executing; the run must still wait
    // for it to finish and report before returning.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while started.load(Ordering::SeqCst) == 0 {
        assert!(tokio::time::Instant::now() < deadline, "job never started");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cancel.cancel();
    task.await.unwrap();

    assert_eq!(engine.completed_keys(), vec![70]);
}
