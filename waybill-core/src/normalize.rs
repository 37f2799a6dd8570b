//! Translation of raw aggregator payloads into canonical tracking snapshots.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{CanonicalStatus, Checkpoint, RawEvent, RawTrackingResult, TrackingSnapshot};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upstream milestone vocabulary, keyed by the folded form produced by `fold_milestone`.
const MILESTONE_TABLE: &[(&str, CanonicalStatus)] = &[
    ("pending", CanonicalStatus::Pending),
    ("inforeceived", CanonicalStatus::InfoReceived),
    ("intransit", CanonicalStatus::InTransit),
    ("outfordelivery", CanonicalStatus::OutForDelivery),
    ("attemptfail", CanonicalStatus::AttemptFail),
    ("failedattempt", CanonicalStatus::AttemptFail),
    ("delivered", CanonicalStatus::Delivered),
    ("availableforpickup", CanonicalStatus::AvailableForPickup),
    ("exception", CanonicalStatus::Exception),
    ("expired", CanonicalStatus::Expired),
];

/// Normalize a raw result, stamping it with the current time.
#[must_use]
pub fn normalize(raw: &RawTrackingResult) -> TrackingSnapshot {
    normalize_at(raw, Utc::now())
}

/// Normalize a raw result as of the given instant.
///
/// Never fails: unknown milestones become [`CanonicalStatus::Pending`] and an
/// empty payload yields a pending snapshot without checkpoints.
#[must_use]
pub fn normalize_at(raw: &RawTrackingResult, now: DateTime<Utc>) -> TrackingSnapshot {
    // Upstream lists events most recent first.
    let latest = raw.events.first();

    let milestone = present(raw.status_milestone.as_deref())
        .or_else(|| latest.and_then(|event| present(event.milestone.as_deref())));

    let sub_status = present(raw.status_code.as_deref())
        .or_else(|| latest.and_then(|event| present(event.status_code.as_deref())))
        .map(str::to_owned);

    TrackingSnapshot {
        canonical_status: milestone.map_or(CanonicalStatus::Pending, map_milestone),
        sub_status,
        location: latest.and_then(event_location),
        estimated_delivery: present(raw.estimated_delivery.as_deref()).and_then(parse_date),
        last_updated: now,
        checkpoints: raw.events.iter().map(checkpoint).collect(),
    }
}

/// Map an upstream milestone onto the canonical status set.
#[must_use]
pub fn map_milestone(raw: &str) -> CanonicalStatus {
    let folded = fold_milestone(raw);

    MILESTONE_TABLE
        .iter()
        .find(|(key, _status)| *key == folded)
        .map_or(CanonicalStatus::Pending, |(_key, status)| *status)
}

fn fold_milestone(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn event_location(event: &RawEvent) -> Option<String> {
    present(event.location.city.as_deref())
        .or_else(|| present(event.location.country.as_deref()))
        .map(str::to_owned)
}

fn checkpoint(event: &RawEvent) -> Checkpoint {
    Checkpoint {
        time: event.occurred_at.clone(),
        message: event.message.clone(),
        city: event.location.city.clone(),
        state: event.location.state.clone(),
        country: event.location.country.clone(),
        milestone: event.milestone.clone(),
        code: event.status_code.clone(),
    }
}

// Accepts plain dates as well as full timestamps such as "2024-05-02T18:00:00Z".
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|segment| !segment.is_empty())
}
