//! Traits describing the aggregator and record-store seams, plus the shared error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use reqwest::StatusCode;

use crate::model::{
    OwnerId, RawTrackingResult, RegistrationResult, ShipmentId, ShipmentRef, TrackerId,
    TrackerRegistration, TrackingNumber, TrackingSnapshot,
};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while syncing shipments.
pub enum TrackingError {
    /// Credentials or other required configuration are missing.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Transport layer failed or timed out.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Aggregator answered with a non-success response.
    #[error("Upstream error (status {status}): {message}")]
    Upstream {
        /// HTTP status of the response.
        status: StatusCode,
        /// Message extracted from the response body.
        message: String,
    },
    /// Aggregator does not know the tracker any more.
    #[error("Tracker not found: {tracker_id}")]
    NotFound {
        /// Tracker the aggregator rejected.
        tracker_id: TrackerId,
    },
    /// No shipment record exists for the identifier.
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),
    /// Record store failed to load or persist.
    #[error("Store error: {0}")]
    Store(String),
}

impl TrackingError {
    /// Whether the error means no shipment can be synced at all.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackingError::Configuration(_))
    }
}

#[async_trait]
/// Trait for the upstream tracking aggregator.
pub trait AggregatorPort: Send + Sync {
    /// Register a tracking number, or return the tracker already registered for it.
    ///
    /// The response carries the current tracking state, so no fetch is needed afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Configuration`] when credentials are missing,
    /// [`TrackingError::Upstream`] for non-success responses and
    /// [`TrackingError::Network`] for transport failures.
    async fn create_or_track(
        &self,
        number: &TrackingNumber,
        reference: Option<&str>,
    ) -> Result<RegistrationResult, TrackingError>;

    /// Fetch the current state of an existing tracker.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the aggregator no longer knows the
    /// tracker, otherwise the same errors as [`AggregatorPort::create_or_track`].
    async fn fetch_results(
        &self,
        tracker_id: &TrackerId,
    ) -> Result<RawTrackingResult, TrackingError>;
}

#[async_trait]
/// Trait for the record store holding shipment records.
pub trait ShipmentStore: Send + Sync {
    /// Shipments of the owner with a tracking number that are not yet delivered.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Store`] when the query fails.
    async fn load_candidates(&self, owner: &OwnerId) -> Result<Vec<ShipmentRef>, TrackingError>;

    /// Load a single shipment record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Store`] when the lookup fails.
    async fn shipment(&self, id: &ShipmentId) -> Result<Option<ShipmentRef>, TrackingError>;

    /// Registration cached for the shipment, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Store`] when the lookup fails.
    async fn registration(
        &self,
        id: &ShipmentId,
    ) -> Result<Option<TrackerRegistration>, TrackingError>;

    /// Persist a fresh snapshot, and the registration when it is new or changed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Store`] when the write fails.
    async fn save_snapshot(
        &self,
        id: &ShipmentId,
        snapshot: &TrackingSnapshot,
        registration: Option<&TrackerRegistration>,
    ) -> Result<(), TrackingError>;
}
