//! Skip rules for identifiers that must never be sent to the aggregator.

use serde::{Deserialize, Serialize};

use crate::model::{ShipmentRef, TrackingNumber};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Carrier whose own tracking page is preferred over the aggregator.
pub struct CarrierExclusion {
    /// Carrier name, matched case-insensitively against the shipment's carrier.
    pub name: String,
    /// Tracking number prefixes identifying the carrier.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl CarrierExclusion {
    fn matches_number(&self, number: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| starts_with_ignore_case(number, prefix))
    }

    fn matches_carrier(&self, carrier: &str) -> bool {
        carrier.trim().eq_ignore_ascii_case(self.name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Data-driven policy deciding which shipments bypass aggregator tracking.
pub struct SkipRules {
    /// Prefixes marking an identifier as a link rather than a tracking number.
    #[serde(default = "default_url_schemes")]
    pub url_schemes: Vec<String>,
    /// Carriers excluded from aggregator tracking.
    #[serde(default)]
    pub excluded_carriers: Vec<CarrierExclusion>,
}

impl Default for SkipRules {
    fn default() -> Self {
        Self {
            url_schemes: default_url_schemes(),
            excluded_carriers: vec![CarrierExclusion {
                name: "Amazon Logistics".to_owned(),
                prefixes: vec!["TBA".to_owned()],
            }],
        }
    }
}

impl SkipRules {
    /// Rules that only recognize URLs and exclude no carrier.
    #[must_use]
    pub fn urls_only() -> Self {
        Self {
            url_schemes: default_url_schemes(),
            excluded_carriers: Vec::new(),
        }
    }

    /// Whether the identifier is not a trackable carrier number.
    #[must_use]
    pub fn should_skip(&self, identifier: &TrackingNumber) -> bool {
        let number = identifier.as_str();

        self.url_schemes
            .iter()
            .any(|scheme| starts_with_ignore_case(number, scheme))
            || self
                .excluded_carriers
                .iter()
                .any(|carrier| carrier.matches_number(number))
    }

    /// Whether the shipment bypasses the aggregator, looking at its carrier too.
    #[must_use]
    pub fn should_skip_shipment(&self, shipment: &ShipmentRef) -> bool {
        if self.should_skip(&shipment.tracking_number) {
            return true;
        }

        shipment.carrier.as_deref().is_some_and(|carrier| {
            self.excluded_carriers
                .iter()
                .any(|excluded| excluded.matches_carrier(carrier))
        })
    }
}

fn default_url_schemes() -> Vec<String> {
    ["http://", "https://", "www."]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    !prefix.is_empty()
        && value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
