//! Record store keeping shipments in process memory.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::model::{OwnerId, ShipmentId, ShipmentRef, TrackerRegistration, TrackingSnapshot};
use crate::ports::{ShipmentStore, TrackingError};

#[derive(Debug, Clone)]
struct StoredShipment {
    owner: OwnerId,
    shipment: ShipmentRef,
    snapshot: Option<TrackingSnapshot>,
}

/// Shipment store backed by a vector, preserving insertion order.
#[derive(Debug, Default)]
pub struct InMemoryShipmentStore {
    records: RwLock<Vec<StoredShipment>>,
}

impl InMemoryShipmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a shipment record for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Store`] when the lock is poisoned.
    pub fn insert(&self, owner: OwnerId, shipment: ShipmentRef) -> Result<(), TrackingError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = StoredShipment {
            owner,
            shipment,
            snapshot: None,
        };

        match records
            .iter_mut()
            .find(|existing| existing.shipment.id == record.shipment.id)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }

        Ok(())
    }

    /// Last snapshot persisted for the shipment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Store`] when the lock is poisoned.
    pub fn snapshot(&self, id: &ShipmentId) -> Result<Option<TrackingSnapshot>, TrackingError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .find(|record| &record.shipment.id == id)
            .and_then(|record| record.snapshot.clone()))
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn load_candidates(&self, owner: &OwnerId) -> Result<Vec<ShipmentRef>, TrackingError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|record| &record.owner == owner && record.shipment.is_in_flight())
            .map(|record| record.shipment.clone())
            .collect())
    }

    async fn shipment(&self, id: &ShipmentId) -> Result<Option<ShipmentRef>, TrackingError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .find(|record| &record.shipment.id == id)
            .map(|record| record.shipment.clone()))
    }

    async fn registration(
        &self,
        id: &ShipmentId,
    ) -> Result<Option<TrackerRegistration>, TrackingError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .find(|record| &record.shipment.id == id)
            .and_then(|record| record.shipment.registration.clone()))
    }

    async fn save_snapshot(
        &self,
        id: &ShipmentId,
        snapshot: &TrackingSnapshot,
        registration: Option<&TrackerRegistration>,
    ) -> Result<(), TrackingError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .iter_mut()
            .find(|record| &record.shipment.id == id)
            .ok_or_else(|| TrackingError::ShipmentNotFound(id.clone()))?;

        if let Some(registration) = registration {
            record.shipment.registration = Some(registration.clone());
        }
        record.shipment.last_status = Some(snapshot.canonical_status);
        record.snapshot = Some(snapshot.clone());

        Ok(())
    }
}

fn poisoned<T>(err: PoisonError<T>) -> TrackingError {
    TrackingError::Store(format!("shipment store lock poisoned: {err}"))
}
