//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, RepeaterSource};
use crate::geo::LatLon;
use crate::models::{
    ExportQuery, FmBandwidth, Membership, OperationalStatus, Repeater, Tone, US_COUNTRY_NAME,
};

/// Builds compatible analog repeaters by default.
pub struct RepeaterBuilder {
    repeater: Repeater,
}

impl RepeaterBuilder {
    pub fn new(repeater_id: u32) -> Self {
        Self {
            repeater: Repeater {
                country: US_COUNTRY_NAME.to_string(),
                state_id: "42".to_string(),
                repeater_id,
                frequency: 146.94,
                input_frequency: 146.34,
                position: Some(LatLon::new(40.0, -75.0)),
                callsign: Some("K1ABC".to_string()),
                location_nearest_city: "Springfield".to_string(),
                state: Some("Pennsylvania".to_string()),
                county: None,
                operational_status: OperationalStatus::OnAir,
                use_membership: Membership::Open,
                analog_capable: true,
                fm_bandwidth: Some(FmBandwidth::Wide),
                pl_ctcss_uplink: Some(Tone::Ctcss(100.0)),
                pl_ctcss_tsq_downlink: None,
                dmr_capable: false,
                dmr_color_code: None,
                last_update: None,
            },
        }
    }

    pub fn country(mut self, country: &str) -> Self {
        self.repeater.country = country.to_string();
        self
    }

    pub fn state_id(mut self, state_id: &str) -> Self {
        self.repeater.state_id = state_id.to_string();
        self
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.repeater.position = Some(LatLon::new(lat, lon));
        self
    }

    pub fn no_position(mut self) -> Self {
        self.repeater.position = None;
        self
    }

    pub fn frequency(mut self, mhz: f64) -> Self {
        self.repeater.frequency = mhz;
        self
    }

    pub fn callsign(mut self, callsign: Option<&str>) -> Self {
        self.repeater.callsign = callsign.map(str::to_string);
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.repeater.location_nearest_city = city.to_string();
        self
    }

    pub fn status(mut self, status: OperationalStatus) -> Self {
        self.repeater.operational_status = status;
        self
    }

    pub fn membership(mut self, membership: Membership) -> Self {
        self.repeater.use_membership = membership;
        self
    }

    pub fn analog(mut self, capable: bool) -> Self {
        self.repeater.analog_capable = capable;
        self
    }

    pub fn dmr(mut self, capable: bool, color_code: Option<&str>) -> Self {
        self.repeater.dmr_capable = capable;
        self.repeater.dmr_color_code = color_code.map(str::to_string);
        self
    }

    pub fn bandwidth(mut self, bandwidth: Option<FmBandwidth>) -> Self {
        self.repeater.fm_bandwidth = bandwidth;
        self
    }

    pub fn build(self) -> Repeater {
        self.repeater
    }
}

/// In-process `RepeaterSource` returning canned batches keyed by query.
#[derive(Default)]
pub struct FakeSource {
    batches: Mutex<HashMap<String, Vec<Repeater>>>,
    failures: Mutex<HashMap<String, String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key identifying a (split) query: country codes and state ids.
    pub fn key(query: &ExportQuery) -> String {
        let countries: Vec<&str> = query.countries.iter().map(|c| c.code.as_str()).collect();
        let states: Vec<&str> = query.state_ids.iter().map(String::as_str).collect();
        format!("{}|{}", countries.join(","), states.join(","))
    }

    pub fn with_batch(self, key: &str, repeaters: Vec<Repeater>) -> Self {
        if let Ok(mut batches) = self.batches.lock() {
            batches.insert(key.to_string(), repeaters);
        }
        self
    }

    pub fn with_failure(self, key: &str, message: &str) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(key.to_string(), message.to_string());
        }
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepeaterSource for FakeSource {
    async fn download(&self, query: &ExportQuery) -> Result<Vec<Repeater>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let key = Self::key(query);
        if let Some(message) = self.failures.lock().ok().and_then(|f| f.get(&key).cloned()) {
            return Err(ApiError::ServerError(message));
        }
        Ok(self
            .batches
            .lock()
            .ok()
            .and_then(|b| b.get(&key).cloned())
            .unwrap_or_default())
    }
}
