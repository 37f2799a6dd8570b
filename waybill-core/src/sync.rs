//! Single-shipment sync: reuse or create the aggregator registration, normalize, persist.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::{RawTrackingResult, ShipmentRef, TrackerRegistration, TrackingSnapshot};
use crate::normalize::normalize;
use crate::ports::{AggregatorPort, ShipmentStore, TrackingError};
use crate::skip::SkipRules;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of syncing one shipment.
pub enum SyncOutcome {
    /// A fresh snapshot was computed and persisted.
    Synced(TrackingSnapshot),
    /// The identifier is excluded from aggregator tracking; nothing was touched.
    Skipped,
}

/// Coordinates the aggregator, the normalizer, and the record store for one shipment.
pub struct SyncOrchestrator {
    aggregator: Arc<dyn AggregatorPort>,
    store: Arc<dyn ShipmentStore>,
    skip_rules: Arc<SkipRules>,
}

impl SyncOrchestrator {
    /// Create an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        aggregator: Arc<dyn AggregatorPort>,
        store: Arc<dyn ShipmentStore>,
        skip_rules: Arc<SkipRules>,
    ) -> Self {
        Self {
            aggregator,
            store,
            skip_rules,
        }
    }

    /// Sync one shipment and persist the resulting snapshot.
    ///
    /// Blank and excluded tracking numbers are skipped before any I/O.
    /// A cached registration is fetched; when the aggregator has forgotten it the
    /// shipment is registered again. Without a usable registration the shipment is
    /// registered, and the registration response already carries current state.
    ///
    /// # Errors
    ///
    /// Propagates every aggregator and store error except
    /// [`TrackingError::NotFound`], which triggers re-registration.
    pub async fn sync(&self, shipment: &ShipmentRef) -> Result<SyncOutcome, TrackingError> {
        if shipment.tracking_number.is_blank() {
            debug!(shipment_id = %shipment.id, "no tracking number to sync");
            return Ok(SyncOutcome::Skipped);
        }
        if self.skip_rules.should_skip_shipment(shipment) {
            debug!(shipment_id = %shipment.id, "identifier excluded from aggregator tracking");
            return Ok(SyncOutcome::Skipped);
        }

        let cached = self.cached_registration(shipment).await?;

        let (raw, registration) = match &cached {
            Some(registration) => {
                match self.aggregator.fetch_results(&registration.tracker_id).await {
                    Ok(raw) => (raw, registration.clone()),
                    Err(TrackingError::NotFound { tracker_id }) => {
                        warn!(
                            shipment_id = %shipment.id,
                            %tracker_id,
                            "aggregator forgot tracker, registering again"
                        );
                        self.register(shipment).await?
                    }
                    Err(err) => return Err(err),
                }
            }
            None => self.register(shipment).await?,
        };

        let snapshot = normalize(&raw);

        let changed = cached.as_ref() != Some(&registration);
        self.store
            .save_snapshot(&shipment.id, &snapshot, changed.then_some(&registration))
            .await?;

        info!(
            shipment_id = %shipment.id,
            tracker_id = %registration.tracker_id,
            status = %snapshot.canonical_status,
            checkpoints = snapshot.checkpoints.len(),
            "shipment synced"
        );

        Ok(SyncOutcome::Synced(snapshot))
    }

    // A registration made for a different tracking number is treated as absent.
    async fn cached_registration(
        &self,
        shipment: &ShipmentRef,
    ) -> Result<Option<TrackerRegistration>, TrackingError> {
        let cached = match &shipment.registration {
            Some(registration) => Some(registration.clone()),
            None => self.store.registration(&shipment.id).await?,
        };

        Ok(cached.filter(|registration| {
            let current = registration.tracks(&shipment.tracking_number);
            if !current {
                debug!(
                    shipment_id = %shipment.id,
                    tracker_id = %registration.tracker_id,
                    "tracking number changed since registration"
                );
            }
            current
        }))
    }

    async fn register(
        &self,
        shipment: &ShipmentRef,
    ) -> Result<(RawTrackingResult, TrackerRegistration), TrackingError> {
        let created = self
            .aggregator
            .create_or_track(&shipment.tracking_number, shipment.reference.as_deref())
            .await?;

        let registration = TrackerRegistration {
            tracker_id: created.tracker_id,
            tracking_number: shipment.tracking_number.clone(),
        };

        Ok((created.result, registration))
    }
}
