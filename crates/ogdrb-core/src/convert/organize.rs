//! Arranging channels into a codeplug within the radio's limits.

use tracing::{info, warn};

use crate::models::{Channel, Codeplug, CodeplugZone, Limits, ANALOG_ZONE, DIGITAL_ZONE};
use crate::services::ZoneRepeaters;
use crate::utils::{truncate_chars, MakeUnique};

/// Build an OpenGD77 codeplug from resolved zones.
pub fn organize(zones: &[ZoneRepeaters]) -> Codeplug {
    organize_with_limits(zones, &Limits::OPENGD77)
}

/// Channels follow zone order, then repeater order within the zone, with a
/// repeater's analog channel ahead of its digital one. Names are cut to
/// `limits.channel_name_chars` and made unique before the list is cut to `limits.channels`; the Digital and
/// Analog zones are then filled from what is left, up to
/// `limits.channels_per_zone` each.
pub fn organize_with_limits(zones: &[ZoneRepeaters], limits: &Limits) -> Codeplug {
    let mut channels: Vec<Channel> = Vec::new();
    for zone in zones {
        for repeater in &zone.repeaters {
            if let Some(analog) = &repeater.analog {
                channels.push(Channel::Analog(analog.clone()));
            }
            if let Some(digital) = &repeater.digital {
                channels.push(Channel::Digital(digital.clone()));
            }
        }
    }

    for channel in &mut channels {
        if channel.name().chars().count() > limits.channel_name_chars {
            let name = truncate_chars(channel.name(), limits.channel_name_chars);
            channel.set_name(name);
        }
    }

    let mut unique = MakeUnique::new(
        channels.iter().map(|c| c.name().to_string()),
        limits.channel_name_chars,
    );
    for channel in &mut channels {
        let name = unique.make(channel.name());
        channel.set_name(name);
    }

    if channels.len() > limits.channels {
        warn!(
            dropped = channels.len() - limits.channels,
            limit = limits.channels,
            "Too many channels, truncating"
        );
        channels.truncate(limits.channels);
    }

    let zone_of = |digital: bool| -> Vec<String> {
        channels
            .iter()
            .filter(|c| c.is_digital() == digital)
            .take(limits.channels_per_zone)
            .map(|c| c.name().to_string())
            .collect()
    };
    let zones = vec![
        CodeplugZone {
            name: DIGITAL_ZONE.to_string(),
            channels: zone_of(true),
        },
        CodeplugZone {
            name: ANALOG_ZONE.to_string(),
            channels: zone_of(false),
        },
    ];

    info!(
        channels = channels.len(),
        digital = zones[0].channels.len(),
        analog = zones[1].channels.len(),
        "Organized codeplug"
    );

    Codeplug { channels, zones }
}
