//! # Request Retry
//!
//! Bounded retry with exponential backoff for Vault requests. Transport errors
//! and throttling/server-error status codes (429, 500, 502, 503, 504) are
//! retried; everything else is returned to the caller on the first attempt.

use crate::constants::RETRYABLE_STATUS_CODES;
use crate::error::ProtocolError;
use crate::observability::metrics;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Retry settings for one kind of request
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each following one
    pub backoff: Duration,
    /// Whether retryable status codes trigger a retry
    pub retry_on_status: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
            retry_on_status: true,
        }
    }

    /// Same policy, but status codes are returned as-is
    ///
    /// Used for the health endpoint, whose status code is the answer.
    pub fn transport_only(self) -> Self {
        Self {
            retry_on_status: false,
            ..self
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff.saturating_mul(factor)
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_on_status && RETRYABLE_STATUS_CODES.contains(&status.as_u16())
    }
}

/// Send a request built by `build`, retrying according to `policy`
///
/// `build` is called once per attempt. A response with a retryable status is
/// returned unchanged once retries are exhausted, so the caller still sees it.
pub(crate) async fn send_with_retry<F>(
    policy: &RetryPolicy,
    operation: &'static str,
    url: &str,
    build: F,
) -> Result<Response, ProtocolError>
where
    F: Fn() -> RequestBuilder,
{
    let mut retry = 0;
    loop {
        match build().send().await {
            Ok(response) if retry < policy.max_retries && policy.should_retry_status(response.status()) => {
                retry += 1;
                debug!(
                    url = url,
                    status = response.status().as_u16(),
                    "Retryable status, retry {}/{}",
                    retry,
                    policy.max_retries
                );
            }
            Ok(response) => return Ok(response),
            Err(e) if retry < policy.max_retries => {
                retry += 1;
                debug!(url = url, error = %e, "Request failed, retry {}/{}", retry, policy.max_retries);
            }
            Err(source) => {
                return Err(ProtocolError::Transport {
                    url: url.to_string(),
                    source,
                })
            }
        }
        metrics::increment_request_retries(operation);
        tokio::time::sleep(policy.delay_for(retry)).await;
    }
}
