//! HTTP client for the engine's job-queue gateway.
//!
//! Wraps the gateway's JSON API (job leasing, completion, failure,
//! message publishing) using [`reqwest`]. The wire format mirrors the
//! job-queue contract one-to-one; anything beyond it (process
//! deployment, instance management) is out of scope for the worker.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use payflow_core::VariableMap;

use crate::client::{EngineClient, EngineError};
use crate::job::ActivatedJob;

/// HTTP client for a single engine gateway.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaseRequest<'a> {
    job_type: &'a str,
    max_count: usize,
    lock_duration_ms: u64,
}

#[derive(Deserialize)]
struct LeaseResponse {
    jobs: Vec<ActivatedJob>,
}

#[derive(Serialize)]
struct CompleteRequest {
    variables: VariableMap,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailRequest<'a> {
    error_message: &'a str,
    retries: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest<'a> {
    name: &'a str,
    correlation_key: &'a str,
    variables: VariableMap,
    time_to_live_ms: u64,
}

impl GatewayClient {
    /// Create a new client for a gateway.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://engine:26500`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`EngineError::Gateway`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, EngineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EngineError::Gateway {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, EngineError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), EngineError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl EngineClient for GatewayClient {
    async fn lease_jobs(
        &self,
        job_type: &str,
        max_count: usize,
        lock_duration: Duration,
    ) -> Result<Vec<ActivatedJob>, EngineError> {
        let body = LeaseRequest {
            job_type,
            max_count,
            lock_duration_ms: lock_duration.as_millis() as u64,
        };

        let response = self
            .client
            .post(format!("{}/jobs/lease", self.base_url))
            .json(&body)
            .send()
            .await?;

        let leased: LeaseResponse = Self::parse_response(response).await?;
        Ok(leased.jobs)
    }

    async fn complete_job(&self, key: i64, variables: VariableMap) -> Result<(), EngineError> {
        let response = self
            .client
            .post(format!("{}/jobs/{}/complete", self.base_url, key))
            .json(&CompleteRequest { variables })
            .send()
            .await?;

        Self::check_status(response).await
    }

    async fn fail_job(
        &self,
        key: i64,
        error_message: &str,
        retries: u32,
    ) -> Result<(), EngineError> {
        let response = self
            .client
            .post(format!("{}/jobs/{}/fail", self.base_url, key))
            .json(&FailRequest {
                error_message,
                retries,
            })
            .send()
            .await?;

        Self::check_status(response).await
    }

    async fn publish_message(
        &self,
        name: &str,
        correlation_key: &str,
        variables: VariableMap,
        time_to_live: Duration,
    ) -> Result<(), EngineError> {
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .json(&PublishRequest {
                name,
                correlation_key,
                variables,
                time_to_live_ms: time_to_live.as_millis() as u64,
            })
            .send()
            .await?;

        Self::check_status(response).await
    }
}
