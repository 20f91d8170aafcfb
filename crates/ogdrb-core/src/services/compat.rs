//! OpenGD77 compatibility rules.
//!
//! The same predicate drives both the compatible-repeater listing and zone
//! export, so the two always agree.

use crate::models::{FmBandwidth, Membership, OperationalStatus, Repeater};

/// 2 m band, MHz.
pub const BAND_2M: (f64, f64) = (144.0, 148.0);

/// 70 cm band, MHz.
pub const BAND_70CM: (f64, f64) = (420.0, 450.0);

/// Whether the downlink frequency lies in a band the radio supports.
pub fn in_supported_band(frequency_mhz: f64) -> bool {
    [BAND_2M, BAND_70CM]
        .iter()
        .any(|&(low, high)| (low..=high).contains(&frequency_mhz))
}

/// A repeater is compatible iff it is analog or DMR capable, on air, open,
/// on 2 m or 70 cm, and declares either no FM bandwidth or 12.5/25 kHz.
pub fn is_compatible(repeater: &Repeater) -> bool {
    (repeater.analog_capable || repeater.dmr_capable)
        && repeater.operational_status == OperationalStatus::OnAir
        && repeater.use_membership == Membership::Open
        && in_supported_band(repeater.frequency)
        && matches!(
            repeater.fm_bandwidth,
            None | Some(FmBandwidth::Narrow) | Some(FmBandwidth::Wide)
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RepeaterBuilder;

    #[test]
    fn test_compatible_baseline() {
        let repeater = RepeaterBuilder::new(1).build();
        assert!(is_compatible(&repeater));
        // Same input, same answer.
        assert_eq!(is_compatible(&repeater), is_compatible(&repeater));
    }

    #[test]
    fn test_requires_a_mode() {
        let neither = RepeaterBuilder::new(1).analog(false).dmr(false, None).build();
        assert!(!is_compatible(&neither));

        let dmr_only = RepeaterBuilder::new(1)
            .analog(false)
            .dmr(true, Some("1"))
            .bandwidth(None)
            .build();
        assert!(is_compatible(&dmr_only));
    }

    #[test]
    fn test_requires_on_air_and_open() {
        let off_air = RepeaterBuilder::new(1).status(OperationalStatus::OffAir).build();
        let testing = RepeaterBuilder::new(1).status(OperationalStatus::Testing).build();
        let closed = RepeaterBuilder::new(1).membership(Membership::Closed).build();
        let private = RepeaterBuilder::new(1).membership(Membership::Private).build();
        assert!(!is_compatible(&off_air));
        assert!(!is_compatible(&testing));
        assert!(!is_compatible(&closed));
        assert!(!is_compatible(&private));
    }

    #[test]
    fn test_band_edges() {
        for mhz in [144.0, 146.52, 148.0, 420.0, 445.5, 450.0] {
            assert!(is_compatible(&RepeaterBuilder::new(1).frequency(mhz).build()), "{}", mhz);
        }
        for mhz in [143.99, 148.01, 223.5, 419.99, 450.01, 1293.0] {
            assert!(!is_compatible(&RepeaterBuilder::new(1).frequency(mhz).build()), "{}", mhz);
        }
    }

    #[test]
    fn test_bandwidth_rules() {
        let narrow = RepeaterBuilder::new(1).bandwidth(Some(FmBandwidth::Narrow)).build();
        let unset = RepeaterBuilder::new(1).bandwidth(None).build();
        let odd = RepeaterBuilder::new(1)
            .bandwidth(Some(FmBandwidth::Unsupported("20 kHz".to_string())))
            .build();
        assert!(is_compatible(&narrow));
        assert!(is_compatible(&unset));
        assert!(!is_compatible(&odd));
    }
}
