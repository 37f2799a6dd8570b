//! JSON shapes exchanged with the aggregator.

use serde::{Deserialize, Serialize};

use waybill_core::model::{
    RawEvent, RawLocation, RawTrackingResult, RegistrationResult, TrackerId,
};

/// Body of `POST /trackers/track`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackRequest<'req> {
    pub(crate) tracking_number: &'req str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) shipment_reference: Option<&'req str>,
}

/// Envelope shared by the create and results endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TrackingEnvelope {
    pub(crate) data: TrackingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackingData {
    pub(crate) trackings: Option<Vec<Tracking>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tracking {
    pub(crate) tracker: Tracker,
    // Absent and null are both accepted for everything below the tracker.
    shipment: Option<Shipment>,
    events: Option<Vec<Event>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tracker {
    pub(crate) tracker_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Shipment {
    status_milestone: Option<String>,
    status_code: Option<String>,
    delivery: Option<Delivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Delivery {
    estimated_delivery_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    occurrence_datetime: Option<String>,
    status: Option<String>,
    location: Option<Location>,
    status_milestone: Option<String>,
    status_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    errors: Option<Vec<ErrorEntry>>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: Option<String>,
}

impl ErrorBody {
    /// First non-empty message carried by the body.
    pub(crate) fn message(self) -> Option<String> {
        self.errors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| entry.message)
            .chain(self.message)
            .find(|message| !message.trim().is_empty())
    }
}

impl Tracking {
    pub(crate) fn into_registration(self) -> RegistrationResult {
        RegistrationResult {
            tracker_id: TrackerId(self.tracker.tracker_id.clone()),
            result: self.into_raw(),
        }
    }

    pub(crate) fn into_raw(self) -> RawTrackingResult {
        let shipment = self.shipment.unwrap_or_default();
        RawTrackingResult {
            status_milestone: shipment.status_milestone,
            status_code: shipment.status_code,
            estimated_delivery: shipment
                .delivery
                .and_then(|delivery| delivery.estimated_delivery_date),
            events: self
                .events
                .unwrap_or_default()
                .into_iter()
                .map(Event::into_raw)
                .collect(),
        }
    }
}

impl Event {
    fn into_raw(self) -> RawEvent {
        let location = self.location.unwrap_or_default();
        RawEvent {
            occurred_at: self.occurrence_datetime,
            message: self.status,
            location: RawLocation {
                city: location.city,
                state: location.state,
                country: location.country,
            },
            milestone: self.status_milestone,
            status_code: self.status_code,
        }
    }
}
