//! High-level service facade combining the orchestrator and the batch refresher.

use std::sync::Arc;

use crate::batch::{BatchConfig, BatchRefresher, RefreshReport};
use crate::model::{OwnerId, ShipmentId, ShipmentRef};
use crate::ports::{AggregatorPort, ShipmentStore, TrackingError};
use crate::skip::SkipRules;
use crate::sync::{SyncOrchestrator, SyncOutcome};

/// Public entry point for on-demand and batch shipment syncs.
pub struct WaybillService {
    store: Arc<dyn ShipmentStore>,
    orchestrator: Arc<SyncOrchestrator>,
    refresher: BatchRefresher,
}

impl WaybillService {
    /// Wire a service from the aggregator, the record store, and the engine policies.
    #[must_use]
    pub fn new(
        aggregator: Arc<dyn AggregatorPort>,
        store: Arc<dyn ShipmentStore>,
        skip_rules: SkipRules,
        batch: BatchConfig,
    ) -> Self {
        let orchestrator = Arc::new(SyncOrchestrator::new(
            aggregator,
            Arc::clone(&store),
            Arc::new(skip_rules),
        ));
        let refresher = BatchRefresher::new(Arc::clone(&orchestrator), Arc::clone(&store), batch);

        Self {
            store,
            orchestrator,
            refresher,
        }
    }

    /// Sync a shipment the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackingError`] if the aggregator or the record store fails.
    pub async fn sync(&self, shipment: &ShipmentRef) -> Result<SyncOutcome, TrackingError> {
        self.orchestrator.sync(shipment).await
    }

    /// Load a shipment from the record store and sync it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::ShipmentNotFound`] for unknown identifiers, otherwise
    /// the same errors as [`WaybillService::sync`].
    pub async fn refresh_shipment(&self, id: &ShipmentId) -> Result<SyncOutcome, TrackingError> {
        let shipment = self
            .store
            .shipment(id)
            .await?
            .ok_or_else(|| TrackingError::ShipmentNotFound(id.clone()))?;

        self.orchestrator.sync(&shipment).await
    }

    /// Refresh every in-flight shipment of an owner.
    ///
    /// # Errors
    ///
    /// Returns a [`TrackingError`] if the candidate query fails or the aggregator is
    /// not configured; per-shipment failures are part of the report instead.
    pub async fn refresh_all(&self, owner: &OwnerId) -> Result<RefreshReport, TrackingError> {
        self.refresher.refresh_all(owner).await
    }
}
