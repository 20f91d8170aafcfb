//! OpenGD77 channel definitions.

use serde::{Deserialize, Serialize};

use super::repeater::Tone;
use crate::geo::LatLon;

/// Capacity limits of the target codeplug format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum characters in a channel name.
    pub channel_name_chars: usize,
    /// Maximum channels in the codeplug.
    pub channels: usize,
    /// Maximum channels listed in one zone.
    pub channels_per_zone: usize,
}

impl Limits {
    pub const OPENGD77: Limits = Limits {
        channel_name_chars: 16,
        channels: 1024,
        channels_per_zone: 80,
    };
}

impl Default for Limits {
    fn default() -> Self {
        Self::OPENGD77
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bandwidth {
    #[serde(rename = "12.5")]
    Khz12_5,
    #[serde(rename = "25")]
    Khz25,
}

/// Talker alias content types broadcast on a timeslot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkerAlias {
    pub aprs: bool,
    pub text: bool,
}

impl TalkerAlias {
    pub const ALL: TalkerAlias = TalkerAlias {
        aprs: true,
        text: true,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalogChannel {
    pub name: String,
    /// MHz
    pub rx_frequency: f64,
    /// MHz
    pub tx_frequency: f64,
    pub position: Option<LatLon>,
    pub use_location: bool,
    pub bandwidth: Bandwidth,
    pub tx_tone: Option<Tone>,
    pub rx_tone: Option<Tone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalChannel {
    pub name: String,
    /// MHz
    pub rx_frequency: f64,
    /// MHz
    pub tx_frequency: f64,
    pub position: Option<LatLon>,
    pub use_location: bool,
    pub color_code: u8,
    pub repeater_timeslot: u8,
    pub timeslot_1_talker_alias: TalkerAlias,
    pub timeslot_2_talker_alias: TalkerAlias,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Channel {
    Analog(AnalogChannel),
    Digital(DigitalChannel),
}

impl Channel {
    pub fn name(&self) -> &str {
        match self {
            Channel::Analog(ch) => &ch.name,
            Channel::Digital(ch) => &ch.name,
        }
    }

    pub fn set_name(&mut self, name: String) {
        match self {
            Channel::Analog(ch) => ch.name = name,
            Channel::Digital(ch) => ch.name = name,
        }
    }

    pub fn is_digital(&self) -> bool {
        matches!(self, Channel::Digital(_))
    }
}
