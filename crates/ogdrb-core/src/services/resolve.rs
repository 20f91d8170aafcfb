//! Resolving zones to the compatible repeaters inside them.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{RepeaterStore, StoreQuery};
use crate::convert::channel::to_channels;
use crate::error::Result;
use crate::geo::{distance_km, BoundingBox};
use crate::models::{AnalogChannel, DigitalChannel, RegionFilter, Repeater, RepeaterId, Zone};

/// A repeater together with the channels derived from it.
///
/// Two values are equal when they describe the same repeater, whatever the
/// record contents.
#[derive(Debug, Clone)]
pub struct UniRepeater {
    pub id: RepeaterId,
    pub repeater: Repeater,
    pub analog: Option<AnalogChannel>,
    pub digital: Option<DigitalChannel>,
}

impl UniRepeater {
    pub fn from_repeater(repeater: Repeater) -> Self {
        let (analog, digital) = to_channels(&repeater);
        Self {
            id: repeater.id(),
            repeater,
            analog,
            digital,
        }
    }
}

impl PartialEq for UniRepeater {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UniRepeater {}

impl Hash for UniRepeater {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The repeaters found inside one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRepeaters {
    pub name: String,
    pub repeaters: Vec<UniRepeater>,
}

/// Reads the store to find repeaters inside zones. Never downloads.
#[derive(Clone)]
pub struct ZoneResolver {
    store: Arc<RepeaterStore>,
}

impl ZoneResolver {
    pub fn new(store: Arc<RepeaterStore>) -> Self {
        Self { store }
    }

    /// Compatible repeaters inside each zone, in zone order.
    ///
    /// A repeater on the circle's edge counts as inside. Overlapping zones
    /// each list the shared repeaters.
    pub fn resolve(&self, zones: &[Zone], region: &RegionFilter) -> Result<Vec<ZoneRepeaters>> {
        zones
            .iter()
            .map(|zone| self.resolve_zone(zone, region))
            .collect()
    }

    fn resolve_zone(&self, zone: &Zone, region: &RegionFilter) -> Result<ZoneRepeaters> {
        let bbox = BoundingBox::around(zone.center, zone.radius_km);
        let query = StoreQuery::region(region.clone()).within(bbox).compatible();
        let candidates = self.store.query(&query)?;
        let in_box = candidates.len();

        let repeaters: Vec<UniRepeater> = candidates
            .into_iter()
            .filter(|repeater| match repeater.position {
                Some(position) => distance_km(zone.center, position) <= zone.radius_km,
                None => {
                    debug!(id = %repeater.id(), "Skipping repeater without position");
                    false
                }
            })
            .map(UniRepeater::from_repeater)
            .collect();

        info!(
            zone = %zone.name,
            radius_km = zone.radius_km,
            in_box,
            in_circle = repeaters.len(),
            "Resolved zone"
        );

        Ok(ZoneRepeaters {
            name: zone.name.clone(),
            repeaters,
        })
    }

    /// Every compatible repeater in the region, for map display.
    pub fn compatible_repeaters(&self, region: &RegionFilter) -> Result<Vec<Repeater>> {
        Ok(self
            .store
            .query(&StoreQuery::region(region.clone()).compatible())?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::geo::LatLon;
    use crate::models::{Membership, OperationalStatus};
    use crate::testing::RepeaterBuilder;

    fn resolver_with(repeaters: Vec<Repeater>) -> ZoneResolver {
        let store = Arc::new(RepeaterStore::in_memory());
        store.upsert(repeaters).expect("upsert");
        ZoneResolver::new(store)
    }

    #[test]
    fn test_uni_repeater_identity_is_natural_key() {
        let a = UniRepeater::from_repeater(RepeaterBuilder::new(1).city("Old").build());
        let b = UniRepeater::from_repeater(RepeaterBuilder::new(1).city("New").build());
        let c = UniRepeater::from_repeater(RepeaterBuilder::new(2).build());
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<UniRepeater> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_counts_repeaters_inside_circle() {
        let center = LatLon::new(40.0, -75.0);
        // 0.05 degrees of latitude is about 5.6 km.
        let inside: Vec<Repeater> = (1..=5)
            .map(|i| RepeaterBuilder::new(i).at(40.0 + 0.01 * i as f64, -75.0).build())
            .collect();
        let outside = vec![
            RepeaterBuilder::new(10).at(40.5, -75.0).build(),
            RepeaterBuilder::new(11).at(40.0, -74.0).build(),
        ];
        let resolver = resolver_with(inside.into_iter().chain(outside).collect());

        let zones = vec![Zone::new("Home", center, 10.0)];
        let result = resolver.resolve(&zones, &RegionFilter::default()).expect("resolve");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Home");
        let ids: Vec<u32> = result[0].repeaters.iter().map(|r| r.id.repeater_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_excludes_incompatible() {
        let resolver = resolver_with(vec![
            RepeaterBuilder::new(1).build(),
            RepeaterBuilder::new(2).status(OperationalStatus::OffAir).build(),
            RepeaterBuilder::new(3).membership(Membership::Closed).build(),
            RepeaterBuilder::new(4).frequency(223.5).build(),
        ]);
        let zones = vec![Zone::new("Home", LatLon::new(40.0, -75.0), 5.0)];
        let result = resolver.resolve(&zones, &RegionFilter::default()).expect("resolve");
        assert_eq!(result[0].repeaters.len(), 1);
        assert_eq!(result[0].repeaters[0].id.repeater_id, 1);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let center = LatLon::new(40.0, -75.0);
        let position = LatLon::new(40.07, -74.91);
        let distance = distance_km(center, position);
        let resolver = resolver_with(vec![RepeaterBuilder::new(1).at(40.07, -74.91).build()]);

        let on_edge = resolver
            .resolve(&[Zone::new("Edge", center, distance)], &RegionFilter::default())
            .expect("resolve");
        assert_eq!(on_edge[0].repeaters.len(), 1);

        let just_short = resolver
            .resolve(&[Zone::new("Short", center, distance - 1e-9)], &RegionFilter::default())
            .expect("resolve");
        assert!(just_short[0].repeaters.is_empty());
    }

    #[test]
    fn test_edge_due_north_and_south_is_inside() {
        let center = LatLon::new(-60.0, 122.31458825688566);
        for offset in [0.001, 0.0137, 0.05, 0.3, 1.1] {
            for sign in [1.0, -1.0] {
                let position = LatLon::new(center.lat + sign * offset, center.lon);
                let resolver = resolver_with(vec![RepeaterBuilder::new(1)
                    .at(position.lat, position.lon)
                    .build()]);
                let zone = Zone::new("Edge", center, distance_km(center, position));

                let result = resolver
                    .resolve(&[zone], &RegionFilter::default())
                    .expect("resolve");
                assert_eq!(result[0].repeaters.len(), 1, "offset {}", sign * offset);
            }
        }
    }

    #[test]
    fn test_overlapping_zones_both_list_repeater() {
        let resolver = resolver_with(vec![RepeaterBuilder::new(1).build()]);
        let zones = vec![
            Zone::new("A", LatLon::new(40.0, -75.0), 5.0),
            Zone::new("B", LatLon::new(40.01, -75.0), 5.0),
        ];
        let result = resolver.resolve(&zones, &RegionFilter::default()).expect("resolve");
        let names: Vec<&str> = result.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(result[0].repeaters, result[1].repeaters);
    }

    #[test]
    fn test_missing_position_excluded() {
        let resolver = resolver_with(vec![RepeaterBuilder::new(1).no_position().build()]);
        let zones = vec![Zone::new("Home", LatLon::new(40.0, -75.0), 50.0)];
        let result = resolver.resolve(&zones, &RegionFilter::default()).expect("resolve");
        assert!(result[0].repeaters.is_empty());
    }

    #[test]
    fn test_region_filter_applies() {
        let resolver = resolver_with(vec![
            RepeaterBuilder::new(1).state_id("42").build(),
            RepeaterBuilder::new(2).state_id("36").build(),
        ]);
        let region = RegionFilter {
            us_state_ids: ["42".to_string()].into_iter().collect(),
            ..RegionFilter::default()
        };
        let zones = vec![Zone::new("Home", LatLon::new(40.0, -75.0), 5.0)];
        let result = resolver.resolve(&zones, &region).expect("resolve");
        assert_eq!(result[0].repeaters.len(), 1);
        assert_eq!(result[0].repeaters[0].id.state_id, "42");

        let map = resolver.compatible_repeaters(&region).expect("compatible");
        assert_eq!(map.len(), 1);
    }
}
