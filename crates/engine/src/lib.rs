//! Workflow-engine job-queue contract and clients.
//!
//! The engine itself is an external service. This crate defines the
//! worker's view of it:
//!
//! - [`ActivatedJob`] — a leased unit of work.
//! - [`EngineClient`] — the job-queue contract (lease, complete, fail,
//!   publish message), implemented by [`GatewayClient`] over HTTP and
//!   by [`testing::InMemoryEngine`] for tests.
//! - [`backoff`] — bounded exponential-backoff retry helpers used when
//!   reporting job outcomes.

pub mod backoff;
pub mod client;
pub mod gateway;
pub mod job;
pub mod testing;

pub use client::{EngineClient, EngineError};
pub use gateway::GatewayClient;
pub use job::ActivatedJob;
