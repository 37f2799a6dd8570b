//! Test doubles for the aggregator port.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::model::{
    RawEvent, RawTrackingResult, RegistrationResult, TrackerId, TrackingNumber,
};
use crate::ports::{AggregatorPort, TrackingError};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Result(RawTrackingResult),
    NotFound,
    Upstream(StatusCode),
    Unconfigured,
}

impl Scripted {
    fn into_result(self, tracker_id: &TrackerId) -> Result<RawTrackingResult, TrackingError> {
        match self {
            Scripted::Result(raw) => Ok(raw),
            Scripted::NotFound => Err(TrackingError::NotFound {
                tracker_id: tracker_id.clone(),
            }),
            Scripted::Upstream(status) => Err(TrackingError::Upstream {
                status,
                message: "scripted failure".to_owned(),
            }),
            Scripted::Unconfigured => {
                Err(TrackingError::Configuration("missing API key".to_owned()))
            }
        }
    }
}

/// Aggregator double that reuses one tracker per tracking number, like the real service.
#[derive(Debug, Default)]
pub(crate) struct FakeAggregator {
    fetch_scripts: Mutex<HashMap<TrackerId, Scripted>>,
    create_scripts: Mutex<HashMap<String, Scripted>>,
    trackers: Mutex<HashMap<String, TrackerId>>,
    calls: Mutex<Vec<String>>,
}

impl FakeAggregator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_fetch(&self, tracker_id: &str, script: Scripted) {
        self.fetch_scripts
            .lock()
            .unwrap()
            .insert(TrackerId(tracker_id.to_owned()), script);
    }

    pub(crate) fn on_create(&self, number: &str, script: Scripted) {
        self.create_scripts
            .lock()
            .unwrap()
            .insert(number.to_owned(), script);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl AggregatorPort for FakeAggregator {
    async fn create_or_track(
        &self,
        number: &TrackingNumber,
        reference: Option<&str>,
    ) -> Result<RegistrationResult, TrackingError> {
        self.calls.lock().unwrap().push(format!(
            "create:{}:{}",
            number.as_str(),
            reference.unwrap_or("-")
        ));

        let tracker_id = self
            .trackers
            .lock()
            .unwrap()
            .entry(number.as_str().to_owned())
            .or_insert_with(|| TrackerId(format!("trk-{}", number.as_str())))
            .clone();

        let script = self
            .create_scripts
            .lock()
            .unwrap()
            .get(number.as_str())
            .cloned()
            .unwrap_or_else(|| Scripted::Result(raw_with_milestone("info_received")));

        let result = script.into_result(&tracker_id)?;
        Ok(RegistrationResult { tracker_id, result })
    }

    async fn fetch_results(
        &self,
        tracker_id: &TrackerId,
    ) -> Result<RawTrackingResult, TrackingError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch:{tracker_id}"));

        let script = self
            .fetch_scripts
            .lock()
            .unwrap()
            .get(tracker_id)
            .cloned()
            .unwrap_or(Scripted::NotFound);

        script.into_result(tracker_id)
    }
}

pub(crate) fn raw_with_milestone(milestone: &str) -> RawTrackingResult {
    RawTrackingResult {
        status_milestone: Some(milestone.to_owned()),
        status_code: None,
        estimated_delivery: None,
        events: vec![RawEvent {
            occurred_at: Some("2024-04-30T10:00:00Z".to_owned()),
            message: Some(format!("{milestone} scan")),
            milestone: Some(milestone.to_owned()),
            ..RawEvent::default()
        }],
    }
}
