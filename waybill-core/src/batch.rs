//! Batch refresh of every in-flight shipment of an owner.

use std::pin::pin;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::model::{OwnerId, ShipmentId, ShipmentRef, TrackingSnapshot};
use crate::ports::{ShipmentStore, TrackingError};
use crate::sync::{SyncOrchestrator, SyncOutcome};

const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
/// Tuning for batch refreshes.
pub struct BatchConfig {
    /// Maximum number of shipments synced at the same time.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl BatchConfig {
    /// Effective parallelism, never below one.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[derive(Debug)]
/// What happened to a single shipment during a batch refresh.
pub enum RefreshStatus {
    /// A fresh snapshot was persisted.
    Synced(TrackingSnapshot),
    /// The shipment is excluded from aggregator tracking.
    Skipped,
    /// Syncing failed; sibling shipments were still attempted.
    Failed(TrackingError),
}

#[derive(Debug)]
/// Outcome for one shipment of the batch.
pub struct ShipmentOutcome {
    /// Shipment the outcome belongs to.
    pub shipment_id: ShipmentId,
    /// Result of its sync.
    pub status: RefreshStatus,
}

#[derive(Debug)]
/// Per-shipment outcomes of a batch refresh, in candidate order.
pub struct RefreshReport {
    /// Owner whose shipments were refreshed.
    pub owner: OwnerId,
    /// One entry per candidate shipment.
    pub outcomes: Vec<ShipmentOutcome>,
}

impl RefreshReport {
    /// Shipments that were synced, with their snapshots.
    pub fn synced(&self) -> impl Iterator<Item = (&ShipmentId, &TrackingSnapshot)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                RefreshStatus::Synced(snapshot) => Some((&outcome.shipment_id, snapshot)),
                RefreshStatus::Skipped | RefreshStatus::Failed(_) => None,
            })
    }

    /// Shipments excluded from aggregator tracking.
    pub fn skipped(&self) -> impl Iterator<Item = &ShipmentId> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, RefreshStatus::Skipped))
            .map(|outcome| &outcome.shipment_id)
    }

    /// Shipments whose sync failed, with the error.
    pub fn failed(&self) -> impl Iterator<Item = (&ShipmentId, &TrackingError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                RefreshStatus::Failed(err) => Some((&outcome.shipment_id, err)),
                RefreshStatus::Synced(_) | RefreshStatus::Skipped => None,
            })
    }
}

/// Refreshes all in-flight shipments of an owner, isolating per-shipment failures.
pub struct BatchRefresher {
    orchestrator: Arc<SyncOrchestrator>,
    store: Arc<dyn ShipmentStore>,
    config: BatchConfig,
}

impl BatchRefresher {
    /// Create a refresher on top of an orchestrator and the candidate query.
    #[must_use]
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        store: Arc<dyn ShipmentStore>,
        config: BatchConfig,
    ) -> Self {
        Self {
            orchestrator,
            store,
            config,
        }
    }

    /// Sync every in-flight shipment of the owner.
    ///
    /// Shipments run with bounded concurrency and their outcomes are reported in
    /// candidate order. A failing shipment never stops its siblings.
    ///
    /// # Errors
    ///
    /// Returns an error when the candidate query fails, or aborts with
    /// [`TrackingError::Configuration`] as soon as one sync reports it.
    pub async fn refresh_all(&self, owner: &OwnerId) -> Result<RefreshReport, TrackingError> {
        let candidates: Vec<ShipmentRef> = self
            .store
            .load_candidates(owner)
            .await?
            .into_iter()
            .filter(ShipmentRef::is_in_flight)
            .collect();

        info!(
            %owner,
            candidates = candidates.len(),
            concurrency = self.config.concurrency(),
            "refreshing shipments"
        );

        let mut results = pin!(
            stream::iter(candidates)
                .map(|shipment| async move {
                    let result = self.orchestrator.sync(&shipment).await;
                    (shipment.id, result)
                })
                .buffered(self.config.concurrency())
        );

        let mut outcomes = Vec::new();
        while let Some((shipment_id, result)) = results.next().await {
            let status = match result {
                Ok(SyncOutcome::Synced(snapshot)) => RefreshStatus::Synced(snapshot),
                Ok(SyncOutcome::Skipped) => RefreshStatus::Skipped,
                Err(err) if err.is_fatal() => {
                    error!(%owner, %shipment_id, error = %err, "aborting batch refresh");
                    return Err(err);
                }
                Err(err) => {
                    warn!(%shipment_id, error = %err, "shipment sync failed");
                    RefreshStatus::Failed(err)
                }
            };
            outcomes.push(ShipmentOutcome {
                shipment_id,
                status,
            });
        }

        let report = RefreshReport {
            owner: owner.clone(),
            outcomes,
        };

        info!(
            %owner,
            synced = report.synced().count(),
            skipped = report.skipped().count(),
            failed = report.failed().count(),
            "batch refresh finished"
        );

        Ok(report)
    }
}
