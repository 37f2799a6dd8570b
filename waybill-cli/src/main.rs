//! Command line front end for syncing shipment tracking with waybill.

mod cli;
mod input;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use waybill_aggregator::AggregatorClient;
use waybill_core::{
    BatchConfig, InMemoryShipmentStore, OwnerId, ShipmentId, ShipmentRef, ShipmentStore,
    WaybillService,
};

use crate::cli::{Cli, Command};
use crate::output::{OutcomeView, Registrations, ReportView};

const ADHOC_OWNER: &str = "local";
const ADHOC_SHIPMENT: &str = "adhoc";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::setup_tracing(cli.log_level);

    let skip_rules = input::load_skip_rules(cli.skip_rules.as_deref())?;
    let aggregator = Arc::new(AggregatorClient::new(cli.aggregator.into_config())?);
    let store = Arc::new(InMemoryShipmentStore::new());
    let service_store: Arc<dyn ShipmentStore> = Arc::<InMemoryShipmentStore>::clone(&store);
    let service = WaybillService::new(
        aggregator,
        service_store,
        skip_rules,
        BatchConfig {
            concurrency: cli.concurrency,
        },
    );

    match cli.command {
        Command::Track {
            number,
            reference,
            carrier,
        } => {
            let mut shipment = ShipmentRef::new(ADHOC_SHIPMENT, number);
            shipment.reference = reference;
            shipment.carrier = carrier;
            store.insert(OwnerId(ADHOC_OWNER.to_owned()), shipment.clone())?;

            let outcome = service.sync(&shipment).await?;
            let registration = store.registration(&shipment.id).await?;
            output::write_json(&OutcomeView::from_sync(
                ADHOC_SHIPMENT,
                &outcome,
                registration.as_ref(),
            ))?;
        }
        Command::Refresh { shipments, owner } => {
            let records = input::load_shipments(&shipments)?;
            info!(records = records.len(), path = %shipments.display(), "loaded shipments");
            for record in records {
                let (record_owner, shipment) = record.into_parts();
                store.insert(record_owner, shipment)?;
            }

            let report = service.refresh_all(&OwnerId(owner)).await?;
            let registrations =
                persisted_registrations(&store, report.synced().map(|(id, _)| id)).await?;
            output::write_json(&ReportView::new(&report, &registrations))?;
        }
    }

    Ok(())
}

// Registrations as persisted by the sync, so callers can store them back.
async fn persisted_registrations<'report>(
    store: &InMemoryShipmentStore,
    ids: impl Iterator<Item = &'report ShipmentId>,
) -> Result<Registrations> {
    let mut registrations = Registrations::new();
    for id in ids {
        if let Some(registration) = store.registration(id).await? {
            registrations.insert(id.clone(), registration);
        }
    }
    Ok(registrations)
}

#[cfg(test)]
mod tests {
    use waybill_core::{TrackerId, TrackerRegistration, TrackingNumber};

    use super::*;

    #[tokio::test]
    async fn persisted_registrations_skip_unregistered_shipments() {
        let store = InMemoryShipmentStore::new();
        let owner = OwnerId("alice".to_owned());
        let registration = TrackerRegistration {
            tracker_id: TrackerId("trk-1Z1".to_owned()),
            tracking_number: TrackingNumber("1Z1".to_owned()),
        };
        let mut registered = ShipmentRef::new("a", "1Z1");
        registered.registration = Some(registration.clone());
        store.insert(owner.clone(), registered).unwrap();
        store.insert(owner, ShipmentRef::new("b", "1Z2")).unwrap();
        let ids = [ShipmentId("a".to_owned()), ShipmentId("b".to_owned())];

        let registrations = persisted_registrations(&store, ids.iter()).await.unwrap();

        assert_eq!(
            registrations,
            Registrations::from([(ShipmentId("a".to_owned()), registration)])
        );
    }
}
