use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use waybill_core::{
    RefreshReport, RefreshStatus, ShipmentId, SyncOutcome, TrackerRegistration, TrackingSnapshot,
};

/// Registrations read back from the store after a sync, keyed by shipment.
pub(crate) type Registrations = HashMap<ShipmentId, TrackerRegistration>;

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum OutcomeView<'report> {
    Synced {
        shipment_id: &'report str,
        snapshot: &'report TrackingSnapshot,
        registration: Option<&'report TrackerRegistration>,
    },
    Skipped {
        shipment_id: &'report str,
    },
    Failed {
        shipment_id: &'report str,
        error: String,
    },
}

impl<'report> OutcomeView<'report> {
    pub(crate) fn from_sync(
        shipment_id: &'report str,
        outcome: &'report SyncOutcome,
        registration: Option<&'report TrackerRegistration>,
    ) -> Self {
        match outcome {
            SyncOutcome::Synced(snapshot) => OutcomeView::Synced {
                shipment_id,
                snapshot,
                registration,
            },
            SyncOutcome::Skipped => OutcomeView::Skipped { shipment_id },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportView<'report> {
    owner: &'report str,
    synced: usize,
    skipped: usize,
    failed: usize,
    outcomes: Vec<OutcomeView<'report>>,
}

impl<'report> ReportView<'report> {
    pub(crate) fn new(report: &'report RefreshReport, registrations: &'report Registrations) -> Self {
        let outcomes = report
            .outcomes
            .iter()
            .map(|outcome| {
                let shipment_id = outcome.shipment_id.0.as_str();
                match &outcome.status {
                    RefreshStatus::Synced(snapshot) => OutcomeView::Synced {
                        shipment_id,
                        snapshot,
                        registration: registrations.get(&outcome.shipment_id),
                    },
                    RefreshStatus::Skipped => OutcomeView::Skipped { shipment_id },
                    RefreshStatus::Failed(err) => OutcomeView::Failed {
                        shipment_id,
                        error: err.to_string(),
                    },
                }
            })
            .collect();

        Self {
            owner: report.owner.0.as_str(),
            synced: report.synced().count(),
            skipped: report.skipped().count(),
            failed: report.failed().count(),
            outcomes,
        }
    }
}

pub(crate) fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use waybill_core::{OwnerId, ShipmentOutcome, TrackerId, TrackingError, TrackingNumber};

    use super::*;

    fn snapshot() -> TrackingSnapshot {
        serde_json::from_value(json!({
            "canonical_status": "InTransit",
            "sub_status": null,
            "location": "Leipzig",
            "estimated_delivery": null,
            "last_updated": "2024-05-01T12:00:00Z",
            "checkpoints": []
        }))
        .unwrap()
    }

    #[test]
    fn report_view_tags_each_outcome() {
        let report = RefreshReport {
            owner: OwnerId("alice".to_owned()),
            outcomes: vec![
                ShipmentOutcome {
                    shipment_id: ShipmentId("a".to_owned()),
                    status: RefreshStatus::Synced(snapshot()),
                },
                ShipmentOutcome {
                    shipment_id: ShipmentId("b".to_owned()),
                    status: RefreshStatus::Failed(TrackingError::Store("disk full".to_owned())),
                },
                ShipmentOutcome {
                    shipment_id: ShipmentId("c".to_owned()),
                    status: RefreshStatus::Skipped,
                },
            ],
        };

        let registrations = Registrations::from([(
            ShipmentId("a".to_owned()),
            TrackerRegistration {
                tracker_id: TrackerId("trk-a".to_owned()),
                tracking_number: TrackingNumber("1Z999AA10123456784".to_owned()),
            },
        )]);

        let value = serde_json::to_value(ReportView::new(&report, &registrations)).unwrap();

        assert_eq!(value["owner"], json!("alice"));
        assert_eq!(value["synced"], json!(1));
        assert_eq!(value["failed"], json!(1));
        assert_eq!(value["skipped"], json!(1));
        assert_eq!(value["outcomes"][0]["outcome"], json!("synced"));
        assert_eq!(
            value["outcomes"][0]["snapshot"]["canonical_status"],
            json!("InTransit")
        );
        assert_eq!(
            value["outcomes"][0]["registration"],
            json!({ "tracker_id": "trk-a", "tracking_number": "1Z999AA10123456784" })
        );
        assert_eq!(value["outcomes"][1]["outcome"], json!("failed"));
        assert_eq!(value["outcomes"][1]["error"], json!("Store error: disk full"));
        assert_eq!(
            value["outcomes"][2],
            json!({ "outcome": "skipped", "shipment_id": "c" })
        );
    }

    #[test]
    fn skipped_sync_renders_without_snapshot() {
        let value =
            serde_json::to_value(OutcomeView::from_sync("adhoc", &SyncOutcome::Skipped, None))
                .unwrap();

        assert_eq!(value, json!({ "outcome": "skipped", "shipment_id": "adhoc" }));
    }

    #[test]
    fn synced_outcome_without_registration_renders_null() {
        let report = RefreshReport {
            owner: OwnerId("alice".to_owned()),
            outcomes: vec![ShipmentOutcome {
                shipment_id: ShipmentId("a".to_owned()),
                status: RefreshStatus::Synced(snapshot()),
            }],
        };
        let registrations = Registrations::new();

        let value = serde_json::to_value(ReportView::new(&report, &registrations)).unwrap();

        assert_eq!(value["outcomes"][0]["registration"], json!(null));
    }

    #[test]
    fn synced_track_outcome_echoes_registration() {
        let outcome = SyncOutcome::Synced(snapshot());
        let registration = TrackerRegistration {
            tracker_id: TrackerId("trk-1Z1".to_owned()),
            tracking_number: TrackingNumber("1Z1".to_owned()),
        };

        let value =
            serde_json::to_value(OutcomeView::from_sync("adhoc", &outcome, Some(&registration)))
                .unwrap();

        assert_eq!(value["outcome"], json!("synced"));
        assert_eq!(value["registration"]["tracker_id"], json!("trk-1Z1"));
        assert_eq!(value["registration"]["tracking_number"], json!("1Z1"));
    }
}
