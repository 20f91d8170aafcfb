//! Repeater to OpenGD77 channel conversion.

use crate::models::{
    AnalogChannel, Bandwidth, DigitalChannel, FmBandwidth, Limits, Repeater, TalkerAlias,
};
use crate::utils::{capitalize, normalize_ascii, truncate_chars};

const ANALOG_SEPARATOR: char = '~';
const DIGITAL_SEPARATOR: char = '_';

/// Channel name: callsign, a mode separator, then the nearest city as
/// capitalized ASCII words run together, cut to `max_chars`.
pub fn make_name(callsign: Option<&str>, city: &str, digital: bool, max_chars: usize) -> String {
    let separator = if digital {
        DIGITAL_SEPARATOR
    } else {
        ANALOG_SEPARATOR
    };
    let city: String = normalize_ascii(city).split(' ').map(capitalize).collect();
    let name = format!("{}{}{}", callsign.unwrap_or_default(), separator, city);
    truncate_chars(&name, max_chars)
}

fn bandwidth(fm_bandwidth: Option<&FmBandwidth>) -> Bandwidth {
    match fm_bandwidth {
        Some(FmBandwidth::Narrow) => Bandwidth::Khz12_5,
        _ => Bandwidth::Khz25,
    }
}

/// DMR color code as a number; absent or unparsable codes become 0.
fn color_code(raw: Option<&str>) -> u8 {
    raw.and_then(|code| code.trim().parse().ok()).unwrap_or(0)
}

pub fn to_analog(repeater: &Repeater, limits: &Limits) -> Option<AnalogChannel> {
    if !repeater.analog_capable {
        return None;
    }
    Some(AnalogChannel {
        name: make_name(
            repeater.callsign.as_deref(),
            &repeater.location_nearest_city,
            false,
            limits.channel_name_chars,
        ),
        rx_frequency: repeater.frequency,
        tx_frequency: repeater.input_frequency,
        position: repeater.position,
        use_location: repeater.position.is_some(),
        bandwidth: bandwidth(repeater.fm_bandwidth.as_ref()),
        tx_tone: repeater.pl_ctcss_uplink,
        rx_tone: repeater.pl_ctcss_tsq_downlink,
    })
}

pub fn to_digital(repeater: &Repeater, limits: &Limits) -> Option<DigitalChannel> {
    if !repeater.dmr_capable {
        return None;
    }
    Some(DigitalChannel {
        name: make_name(
            repeater.callsign.as_deref(),
            &repeater.location_nearest_city,
            true,
            limits.channel_name_chars,
        ),
        rx_frequency: repeater.frequency,
        tx_frequency: repeater.input_frequency,
        position: repeater.position,
        use_location: repeater.position.is_some(),
        color_code: color_code(repeater.dmr_color_code.as_deref()),
        repeater_timeslot: 1,
        timeslot_1_talker_alias: TalkerAlias::ALL,
        timeslot_2_talker_alias: TalkerAlias::ALL,
    })
}

/// Analog and digital channels for a repeater, each present only when the
/// repeater supports that mode.
pub fn to_channels(repeater: &Repeater) -> (Option<AnalogChannel>, Option<DigitalChannel>) {
    to_channels_with_limits(repeater, &Limits::OPENGD77)
}

pub fn to_channels_with_limits(
    repeater: &Repeater,
    limits: &Limits,
) -> (Option<AnalogChannel>, Option<DigitalChannel>) {
    (to_analog(repeater, limits), to_digital(repeater, limits))
}
