use serde::{Deserialize, Serialize};

use super::channel::Channel;

/// Name of the zone holding every digital channel.
pub const DIGITAL_ZONE: &str = "Digital";

/// Name of the zone holding every analog channel.
pub const ANALOG_ZONE: &str = "Analog";

/// A zone as the radio sees it: a named list of channel names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeplugZone {
    pub name: String,
    pub channels: Vec<String>,
}

/// Export package handed to the codeplug serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codeplug {
    pub channels: Vec<Channel>,
    /// Always `[Digital, Analog]`.
    pub zones: Vec<CodeplugZone>,
}

impl Codeplug {
    pub fn zone(&self, name: &str) -> Option<&CodeplugZone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name() == name)
    }
}
