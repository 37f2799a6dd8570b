//! Client for the upstream carrier-tracking aggregator.
//!
//! Registers tracking numbers and fetches tracker results over HTTP, handing the
//! raw payload to the core engine for normalization.

/// Explicit connection settings for the client.
pub mod config;
mod wire;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use waybill_core::{
    model::{RawTrackingResult, RegistrationResult, TrackerId, TrackingNumber},
    ports::{AggregatorPort, TrackingError},
};

pub use config::AggregatorConfig;

use crate::wire::{ErrorBody, TrackRequest, Tracking, TrackingEnvelope};

/// HTTP implementation of the aggregator port.
pub struct AggregatorClient {
    client: Client,
    config: AggregatorConfig,
}

impl AggregatorClient {
    /// Create a client with its own connection pool and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Network`] if the HTTP client cannot be built.
    pub fn new(config: AggregatorConfig) -> Result<Self, TrackingError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str, TrackingError> {
        self.config
            .api_key()
            .ok_or_else(|| TrackingError::Configuration("aggregator API key is not set".into()))
    }
}

#[async_trait]
impl AggregatorPort for AggregatorClient {
    async fn create_or_track(
        &self,
        number: &TrackingNumber,
        reference: Option<&str>,
    ) -> Result<RegistrationResult, TrackingError> {
        let api_key = self.api_key()?;

        debug!(tracking_number = %number, "registering tracking number");

        let req = self
            .client
            .post(self.config.endpoint(&["trackers", "track"])?)
            .bearer_auth(api_key)
            .json(&TrackRequest {
                tracking_number: number.as_str(),
                shipment_reference: reference.map(str::trim).filter(|text| !text.is_empty()),
            });

        let tracking = fetch_tracking(req).await?;

        debug!(
            tracking_number = %number,
            tracker_id = %tracking.tracker.tracker_id,
            "tracking number registered"
        );

        Ok(tracking.into_registration())
    }

    async fn fetch_results(
        &self,
        tracker_id: &TrackerId,
    ) -> Result<RawTrackingResult, TrackingError> {
        let api_key = self.api_key()?;

        debug!(%tracker_id, "fetching tracker results");

        let req = self
            .client
            .get(
                self.config
                    .endpoint(&["trackers", tracker_id.0.as_str(), "results"])?,
            )
            .bearer_auth(api_key);

        match fetch_tracking(req).await {
            Ok(tracking) => Ok(tracking.into_raw()),
            Err(TrackingError::Upstream {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Err(TrackingError::NotFound {
                tracker_id: tracker_id.clone(),
            }),
            Err(err) => Err(err),
        }
    }
}

// Sends the request and decodes the first tracking of the envelope.
async fn fetch_tracking(req: RequestBuilder) -> Result<Tracking, TrackingError> {
    let response = req.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|err| {
            debug!(%status, error = %err, "failed to read error response body");
            String::from("Unknown error")
        });

        return Err(TrackingError::Upstream {
            status,
            message: error_message(&body, status),
        });
    }

    let body = response.bytes().await?;
    let envelope: TrackingEnvelope =
        serde_json::from_slice(&body).map_err(|err| TrackingError::Upstream {
            status,
            message: format!("Invalid response body: {err}"),
        })?;

    envelope
        .data
        .trackings
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| TrackingError::Upstream {
            status,
            message: "Response carried no tracking".to_owned(),
        })
}

fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| {
            let text = body.trim();
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_owned()
            } else {
                text.to_owned()
            }
        })
}
