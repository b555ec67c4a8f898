//! Collector delivery.
//!
//! One blocking HTTPS POST per event, JSON body, bounded connect and
//! read timeouts. Delivery is strictly best-effort and at-most-once:
//! a failed or rejected POST is logged and dropped. There is no retry,
//! no queue, no backoff — repeated failures simply repeat independently
//! per call. The short timeouts keep a crash report from meaningfully
//! delaying process termination.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::event::Event;

/// Fixed collector domain; the endpoint is
/// `https://<integrationId>.<domain>/`.
pub const COLLECTOR_DOMAIN: &str = "k1.hawk.so";

/// Connect and read timeout applied to every delivery attempt.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Why a delivery attempt failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("collector rejected event: status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outcome of a single delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Collector accepted the event with a 2xx status.
    Delivered { status: u16 },
    /// Transport error, timeout, or non-2xx status. Logged, never retried.
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    /// True when the collector accepted the event.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Ships events to a single collector endpoint.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl DeliveryClient {
    /// Creates a client for the endpoint derived from an integration id.
    pub fn for_integration(integration_id: &str) -> Result<Self, reqwest::Error> {
        Self::new(format!("https://{}.{}/", integration_id, COLLECTOR_DOMAIN))
    }

    /// Creates a client POSTing to the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(DELIVERY_TIMEOUT)
            .timeout(DELIVERY_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// The endpoint this client POSTs to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Delivers one event, blocking the calling thread for at most the
    /// configured timeouts. Never panics and never raises: the outcome
    /// carries the failure, and callers decide whether to surface it.
    pub fn deliver(&self, event: &Event) -> DeliveryOutcome {
        let body = match event.to_json() {
            Ok(body) => body,
            Err(err) => return self.failed(err.into()),
        };

        let response = match self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
        {
            Ok(response) => response,
            Err(err) => return self.failed(err.into()),
        };

        let status = response.status();
        let body = response.text().unwrap_or_default();

        if status.is_success() {
            debug!(status = status.as_u16(), %body, "event delivered");
            DeliveryOutcome::Delivered {
                status: status.as_u16(),
            }
        } else {
            self.failed(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn failed(&self, error: DeliveryError) -> DeliveryOutcome {
        warn!(endpoint = %self.endpoint, error = %error, "event delivery failed");
        DeliveryOutcome::Failed(error)
    }
}
