//! Payflow worker binary.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use payflow_engine::GatewayClient;
use payflow_events::{AckWorkflowsRequested, EventBus};
use payflow_worker::config::WorkerConfig;
use payflow_worker::dispatcher::JobDispatcher;
use payflow_worker::handlers::register_all;
use payflow_worker::publisher::CorrelationPublisher;
use payflow_worker::registry::WorkerRegistry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("payflow_worker=info,payflow_engine=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            error!("ENGINE_GATEWAY_URL must be set");
            std::process::exit(1);
        }
    };
    info!(gateway_url = %config.gateway_url, "Starting payflow worker");

    let client = Arc::new(GatewayClient::new(config.gateway_url.clone()));
    let publisher = Arc::new(CorrelationPublisher::new(client.clone(), config.message_ttl));
    let events = Arc::new(EventBus::default());
    spawn_event_logger(&events);

    let mut registry = WorkerRegistry::new();
    if let Err(e) = register_all(
        &mut registry,
        publisher,
        events.clone(),
        config.max_jobs_per_type,
    ) {
        error!(error = %e, "Handler registration failed");
        std::process::exit(1);
    }
    for binding in registry.bindings() {
        info!(
            job_type = %binding.job_type,
            max_concurrent = binding.max_concurrent,
            "Handler registered"
        );
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let dispatcher = JobDispatcher::new(client, config.dispatcher_config());
    dispatcher.run(registry, cancel).await;
    info!("Worker stopped");
}

/// Drains router events into the log.
///
/// Stands in for the workflow-invocation subscriber in deployments that
/// run the acknowledgement pipeline out of process. Without at least
/// one subscriber, acknowledgement jobs fail instead of losing batches.
fn spawn_event_logger(events: &EventBus) {
    let mut receiver = events.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match AckWorkflowsRequested::from_event(&event) {
                    Ok(request) => info!(
                        batch_id = %request.batch_id,
                        transactions = request.transaction_ids.len(),
                        "Acknowledgement batch routed"
                    ),
                    Err(_) => info!(event_type = %event.event_type, "Router event"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    error!(skipped, "Event logger lagged behind the router");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
