//! Domain data structures for shipments, registrations, and tracking snapshots.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a shipment record in the record store.
pub struct ShipmentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of the user owning a set of shipments.
pub struct OwnerId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Raw tracking identifier as entered by the user.
///
/// Usually a carrier tracking number, occasionally a bare URL.
pub struct TrackingNumber(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Aggregator-side identifier of a registered tracker.
pub struct TrackerId(pub String);

impl TrackingNumber {
    /// Identifier with surrounding whitespace removed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.trim()
    }

    /// Check if the identifier carries no characters besides whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Cached aggregator registration of a shipment.
pub struct TrackerRegistration {
    /// Aggregator identifier used for subsequent fetches.
    pub tracker_id: TrackerId,
    /// Tracking number the registration was created for.
    pub tracking_number: TrackingNumber,
}

impl TrackerRegistration {
    /// Whether this registration still tracks the given number.
    #[must_use]
    pub fn tracks(&self, number: &TrackingNumber) -> bool {
        self.tracking_number.as_str() == number.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Canonical shipment status every carrier vocabulary is reduced to.
pub enum CanonicalStatus {
    /// Registered, no carrier information yet.
    Pending,
    /// Carrier received shipment details but not the parcel.
    InfoReceived,
    /// Moving through the carrier network.
    InTransit,
    /// On the vehicle for final delivery.
    OutForDelivery,
    /// Delivery was attempted and failed.
    AttemptFail,
    /// Delivered to the recipient.
    Delivered,
    /// Waiting at a pickup point.
    AvailableForPickup,
    /// Held, returned, damaged or otherwise off the happy path.
    Exception,
    /// No updates for too long; the carrier stopped tracking.
    Expired,
}

impl CanonicalStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 9] = [
        Self::Pending,
        Self::InfoReceived,
        Self::InTransit,
        Self::OutForDelivery,
        Self::AttemptFail,
        Self::Delivered,
        Self::AvailableForPickup,
        Self::Exception,
        Self::Expired,
    ];
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CanonicalStatus::Pending => "Pending",
            CanonicalStatus::InfoReceived => "InfoReceived",
            CanonicalStatus::InTransit => "InTransit",
            CanonicalStatus::OutForDelivery => "OutForDelivery",
            CanonicalStatus::AttemptFail => "AttemptFail",
            CanonicalStatus::Delivered => "Delivered",
            CanonicalStatus::AvailableForPickup => "AvailableForPickup",
            CanonicalStatus::Exception => "Exception",
            CanonicalStatus::Expired => "Expired",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// One tracking event copied from the aggregator.
pub struct Checkpoint {
    /// Event time exactly as reported upstream.
    pub time: Option<String>,
    /// Free-text status message.
    pub message: Option<String>,
    /// City of the scan.
    pub city: Option<String>,
    /// State, province or region of the scan.
    pub state: Option<String>,
    /// Country of the scan.
    pub country: Option<String>,
    /// Upstream milestone for this event.
    pub milestone: Option<String>,
    /// Fine-grained carrier status code.
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Canonical view of a shipment produced by every sync.
pub struct TrackingSnapshot {
    /// Normalized status.
    pub canonical_status: CanonicalStatus,
    /// Carrier-reported fine-grained status code.
    pub sub_status: Option<String>,
    /// Location of the most recent checkpoint.
    pub location: Option<String>,
    /// Expected delivery date, if the carrier published one.
    pub estimated_delivery: Option<NaiveDate>,
    /// When this snapshot was computed.
    pub last_updated: DateTime<Utc>,
    /// Events in upstream order, most recent first.
    pub checkpoints: Vec<Checkpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Location breakdown of a raw event.
pub struct RawLocation {
    /// City name.
    pub city: Option<String>,
    /// State, province or region.
    pub state: Option<String>,
    /// Country name or code.
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Event as carried by the aggregator payload.
pub struct RawEvent {
    /// Event time as reported upstream.
    pub occurred_at: Option<String>,
    /// Free-text status message.
    pub message: Option<String>,
    /// Where the event happened.
    pub location: RawLocation,
    /// Milestone in aggregator vocabulary.
    pub milestone: Option<String>,
    /// Fine-grained carrier status code.
    pub status_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Aggregator view of a shipment before normalization.
pub struct RawTrackingResult {
    /// Shipment-level milestone, preferred over event milestones.
    pub status_milestone: Option<String>,
    /// Shipment-level fine-grained status code.
    pub status_code: Option<String>,
    /// Estimated delivery as reported upstream.
    pub estimated_delivery: Option<String>,
    /// Events, most recent first.
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Response of a create-or-track call.
pub struct RegistrationResult {
    /// Tracker the aggregator created or reused.
    pub tracker_id: TrackerId,
    /// Current tracking state of that tracker.
    pub result: RawTrackingResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Shipment record as seen by the sync engine.
pub struct ShipmentRef {
    /// Record identifier, the key for every store write.
    pub id: ShipmentId,
    /// Tracking identifier supplied by the user.
    pub tracking_number: TrackingNumber,
    /// Display reference forwarded to the aggregator, e.g. the part name.
    pub reference: Option<String>,
    /// Carrier name, if the user picked one.
    pub carrier: Option<String>,
    /// Registration cached from a previous sync.
    pub registration: Option<TrackerRegistration>,
    /// Status persisted by the previous sync.
    pub last_status: Option<CanonicalStatus>,
}

impl ShipmentRef {
    /// Create a reference for a shipment that has never been synced.
    #[must_use]
    pub fn new<I: Into<String>, N: Into<String>>(id: I, tracking_number: N) -> Self {
        Self {
            id: ShipmentId(id.into()),
            tracking_number: TrackingNumber(tracking_number.into()),
            reference: None,
            carrier: None,
            registration: None,
            last_status: None,
        }
    }

    /// Whether the shipment was already delivered.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.last_status == Some(CanonicalStatus::Delivered)
    }

    /// Whether the shipment belongs in a batch refresh.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        !self.tracking_number.is_blank() && !self.is_delivered()
    }
}
