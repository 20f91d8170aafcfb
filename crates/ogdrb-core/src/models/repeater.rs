//! Repeater records as delivered by the RepeaterBook export API.
//!
//! `ExportResponse`/`RawRepeater` mirror the wire format; `Repeater` is the
//! validated domain record that the store, resolver and converters work on.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::geo::LatLon;

/// Natural key of a repeater: stable across re-downloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepeaterId {
    pub country: String,
    pub state_id: String,
    pub repeater_id: u32,
}

impl fmt::Display for RepeaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country, self.state_id, self.repeater_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationalStatus {
    OnAir,
    OffAir,
    Testing,
    Unknown,
}

impl OperationalStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "on-air" => Self::OnAir,
            "off-air" => Self::OffAir,
            s if s.starts_with("testing") => Self::Testing,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    Open,
    Closed,
    Private,
}

impl Membership {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Declared FM channel bandwidth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FmBandwidth {
    /// 12.5 kHz
    Narrow,
    /// 25 kHz
    Wide,
    /// Anything else, kept verbatim.
    Unsupported(String),
}

impl FmBandwidth {
    /// Parse values like `"12.5 kHz"`, `"25"` or `"25.0 kHz"`.
    /// Empty input means no declared bandwidth.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        let numeric = trimmed
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .trim();
        match numeric.parse::<f64>() {
            Ok(khz) if khz == 12.5 => Some(Self::Narrow),
            Ok(khz) if khz == 25.0 => Some(Self::Wide),
            _ => Some(Self::Unsupported(trimmed.to_string())),
        }
    }
}

/// Sub-audible squelch tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Tone {
    /// CTCSS tone in Hz.
    Ctcss(f64),
    /// DCS code (octal digits as written, e.g. 23 for D023).
    Dcs { code: u16, inverted: bool },
}

impl Tone {
    /// Parse `"100.0"`, `"D023"`, `"D023N"` or `"D023I"`. Blank and `"CSQ"`
    /// mean carrier squelch, i.e. no tone.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("csq") {
            return None;
        }
        if let Some(rest) = trimmed.strip_prefix(['D', 'd']) {
            let inverted = rest.ends_with(['I', 'i']);
            let digits = rest.trim_end_matches(['N', 'n', 'I', 'i']);
            return digits
                .parse::<u16>()
                .ok()
                .map(|code| Self::Dcs { code, inverted });
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .map(Self::Ctcss)
    }
}

/// A repeater station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repeater {
    pub country: String,
    pub state_id: String,
    pub repeater_id: u32,
    /// Downlink (repeater output) frequency in MHz.
    pub frequency: f64,
    /// Uplink (repeater input) frequency in MHz.
    pub input_frequency: f64,
    pub position: Option<LatLon>,
    pub callsign: Option<String>,
    pub location_nearest_city: String,
    pub state: Option<String>,
    pub county: Option<String>,
    pub operational_status: OperationalStatus,
    pub use_membership: Membership,
    pub analog_capable: bool,
    pub fm_bandwidth: Option<FmBandwidth>,
    pub pl_ctcss_uplink: Option<Tone>,
    pub pl_ctcss_tsq_downlink: Option<Tone>,
    pub dmr_capable: bool,
    pub dmr_color_code: Option<String>,
    pub last_update: Option<NaiveDate>,
}

impl Repeater {
    pub fn id(&self) -> RepeaterId {
        RepeaterId {
            country: self.country.clone(),
            state_id: self.state_id.clone(),
            repeater_id: self.repeater_id,
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Body of `export.php` / `exportROW.php`.
#[derive(Debug, Deserialize)]
pub struct ExportResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<RawRepeater>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ExportResponse {
    /// Error message when the API answered with an error body instead of data.
    pub fn error_message(&self) -> Option<String> {
        match self.status.as_deref() {
            Some(status) if status.eq_ignore_ascii_case("error") => Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| "unspecified API error".to_string()),
            ),
            _ => None,
        }
    }

    /// Validated repeaters; records with missing or malformed required fields
    /// are dropped.
    pub fn into_repeaters(self) -> Vec<Repeater> {
        let total = self.results.len();
        let repeaters: Vec<Repeater> = self
            .results
            .into_iter()
            .filter_map(|raw| raw.to_repeater())
            .collect();
        if repeaters.len() < total {
            debug!(
                dropped = total - repeaters.len(),
                total, "Dropped repeater records with missing required fields"
            );
        }
        repeaters
    }
}

/// One repeater as returned by the API. Every field is text (or a bare
/// number) and any of them may be blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepeater {
    #[serde(rename = "State ID", default, deserialize_with = "string_or_number")]
    pub state_id: Option<String>,
    #[serde(rename = "Rptr ID", default, deserialize_with = "string_or_number")]
    pub repeater_id: Option<String>,
    #[serde(rename = "Frequency", default, deserialize_with = "string_or_number")]
    pub frequency: Option<String>,
    #[serde(rename = "Input Freq", default, deserialize_with = "string_or_number")]
    pub input_frequency: Option<String>,
    #[serde(rename = "PL", default, deserialize_with = "string_or_number")]
    pub pl: Option<String>,
    #[serde(rename = "TSQ", default, deserialize_with = "string_or_number")]
    pub tsq: Option<String>,
    #[serde(rename = "Nearest City", default)]
    pub nearest_city: Option<String>,
    #[serde(rename = "County", default)]
    pub county: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Lat", default, deserialize_with = "string_or_number")]
    pub lat: Option<String>,
    #[serde(rename = "Long", default, deserialize_with = "string_or_number")]
    pub lon: Option<String>,
    #[serde(rename = "Callsign", default)]
    pub callsign: Option<String>,
    #[serde(rename = "Use", default)]
    pub use_membership: Option<String>,
    #[serde(rename = "Operational Status", default)]
    pub operational_status: Option<String>,
    #[serde(rename = "FM Analog", default)]
    pub fm_analog: Option<String>,
    #[serde(rename = "FM Bandwidth", default, deserialize_with = "string_or_number")]
    pub fm_bandwidth: Option<String>,
    #[serde(rename = "DMR", default)]
    pub dmr: Option<String>,
    #[serde(rename = "DMR Color Code", default, deserialize_with = "string_or_number")]
    pub dmr_color_code: Option<String>,
    #[serde(rename = "Last Update", default)]
    pub last_update: Option<String>,
}

impl RawRepeater {
    /// Convert to a domain record. Returns `None` when any part of the
    /// natural key, the frequencies or the membership cannot be determined.
    pub fn to_repeater(&self) -> Option<Repeater> {
        let country = non_blank(&self.country)?;
        let state_id = non_blank(&self.state_id)?;
        let repeater_id = non_blank(&self.repeater_id)?.parse::<u32>().ok()?;
        let frequency = parse_f64(&self.frequency)?;
        let input_frequency = parse_f64(&self.input_frequency)?;
        let use_membership = Membership::parse(non_blank(&self.use_membership)?)?;

        let position = match (parse_f64(&self.lat), parse_f64(&self.lon)) {
            (Some(lat), Some(lon)) => Some(LatLon::new(lat, lon)).filter(LatLon::is_valid),
            _ => None,
        };

        Some(Repeater {
            country: country.to_string(),
            state_id: state_id.to_string(),
            repeater_id,
            frequency,
            input_frequency,
            position,
            callsign: non_blank(&self.callsign).map(str::to_string),
            location_nearest_city: self.nearest_city.as_deref().unwrap_or("").trim().to_string(),
            state: non_blank(&self.state).map(str::to_string),
            county: non_blank(&self.county).map(str::to_string),
            operational_status: self
                .operational_status
                .as_deref()
                .map(OperationalStatus::parse)
                .unwrap_or(OperationalStatus::Unknown),
            use_membership,
            analog_capable: is_yes(&self.fm_analog),
            fm_bandwidth: self.fm_bandwidth.as_deref().and_then(FmBandwidth::parse),
            pl_ctcss_uplink: self.pl.as_deref().and_then(Tone::parse),
            pl_ctcss_tsq_downlink: self.tsq.as_deref().and_then(Tone::parse),
            dmr_capable: is_yes(&self.dmr),
            dmr_color_code: non_blank(&self.dmr_color_code).map(str::to_string),
            last_update: non_blank(&self.last_update)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(value: &Option<String>) -> Option<f64> {
    non_blank(value)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_yes(value: &Option<String>) -> bool {
    matches!(non_blank(value), Some(v) if v.eq_ignore_ascii_case("yes"))
}

/// Accept a JSON string, number or null as optional text.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
