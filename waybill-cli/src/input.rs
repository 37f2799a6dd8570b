use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use waybill_core::{
    CanonicalStatus, OwnerId, ShipmentId, ShipmentRef, SkipRules, TrackerId,
    TrackerRegistration, TrackingNumber,
};

/// Shipment record as stored in the JSON shipment file.
#[derive(Debug, Deserialize)]
pub(crate) struct ShipmentRecord {
    id: String,
    owner: String,
    #[serde(default)]
    tracking_number: String,
    reference: Option<String>,
    carrier: Option<String>,
    tracker_id: Option<String>,
    /// Number the tracker was registered for, when it differs from the current one.
    registered_number: Option<String>,
    status: Option<CanonicalStatus>,
}

impl ShipmentRecord {
    pub(crate) fn into_parts(self) -> (OwnerId, ShipmentRef) {
        let tracking_number = TrackingNumber(self.tracking_number);
        let registered_number = self.registered_number.map(TrackingNumber);
        let registration = self.tracker_id.map(|tracker_id| TrackerRegistration {
            tracker_id: TrackerId(tracker_id),
            tracking_number: registered_number.unwrap_or_else(|| tracking_number.clone()),
        });

        let shipment = ShipmentRef {
            id: ShipmentId(self.id),
            tracking_number,
            reference: self.reference,
            carrier: self.carrier,
            registration,
            last_status: self.status,
        };

        (OwnerId(self.owner), shipment)
    }
}

pub(crate) fn load_shipments(path: &Path) -> Result<Vec<ShipmentRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shipment file {}", path.display()))?;
    parse_shipments(&raw).with_context(|| format!("Invalid shipment file {}", path.display()))
}

pub(crate) fn load_skip_rules(path: Option<&Path>) -> Result<SkipRules> {
    let Some(path) = path else {
        return Ok(SkipRules::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read skip rules {}", path.display()))?;
    parse_skip_rules(&raw).with_context(|| format!("Invalid skip rules {}", path.display()))
}

fn parse_shipments(raw: &str) -> Result<Vec<ShipmentRecord>> {
    Ok(serde_json::from_str(raw)?)
}

fn parse_skip_rules(raw: &str) -> Result<SkipRules> {
    Ok(toml::from_str(raw)?)
}
