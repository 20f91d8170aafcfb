//! The set of zones being edited, and the views derived from it.
//!
//! Edits arrive as [`ZoneCommand`]s and are applied in order. The grid and
//! the map never write to each other; both read projections of the book.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::LatLon;
use crate::models::Zone;

pub type ZoneId = u32;

/// A zone as typed by a user or read from a zone file. Radius in km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDraft {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneCommand {
    Add(ZoneDraft),
    Move { id: ZoneId, center: LatLon },
    Resize { id: ZoneId, radius_km: f64 },
    Rename { id: ZoneId, name: String },
    Remove { id: ZoneId },
}

/// Grid row. Radius in km.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRow {
    pub id: ZoneId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
}

/// Map circle. Radius in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub id: ZoneId,
    pub center: LatLon,
    pub radius_m: f64,
}

#[derive(Debug, Clone)]
struct Entry {
    id: ZoneId,
    zone: Zone,
}

/// Ordered zones with stable ids, assigned from 1 upwards and never reused.
#[derive(Debug, Clone, Default)]
pub struct ZoneBook {
    entries: Vec<Entry>,
    next_id: ZoneId,
}

impl ZoneBook {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn from_drafts(drafts: impl IntoIterator<Item = ZoneDraft>) -> Self {
        let mut book = Self::new();
        for draft in drafts {
            book.add(draft);
        }
        book
    }

    fn add(&mut self, draft: ZoneDraft) -> ZoneId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.entries.push(Entry {
            id,
            zone: Zone::new(draft.name, LatLon::new(draft.lat, draft.lng), draft.radius),
        });
        id
    }

    fn entry_mut(&mut self, id: ZoneId) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::invalid_selection(format!("no zone with id {}", id)))
    }

    /// Apply one edit. Returns the id of the zone it touched.
    pub fn apply(&mut self, command: ZoneCommand) -> Result<ZoneId> {
        debug!(?command, "Applying zone command");
        match command {
            ZoneCommand::Add(draft) => Ok(self.add(draft)),
            ZoneCommand::Move { id, center } => {
                self.entry_mut(id)?.zone.center = center;
                Ok(id)
            }
            ZoneCommand::Resize { id, radius_km } => {
                self.entry_mut(id)?.zone.radius_km = radius_km;
                Ok(id)
            }
            ZoneCommand::Rename { id, name } => {
                self.entry_mut(id)?.zone.name = name;
                Ok(id)
            }
            ZoneCommand::Remove { id } => {
                let index = self
                    .entries
                    .iter()
                    .position(|e| e.id == id)
                    .ok_or_else(|| Error::invalid_selection(format!("no zone with id {}", id)))?;
                self.entries.remove(index);
                Ok(id)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rows(&self) -> Vec<ZoneRow> {
        self.entries
            .iter()
            .map(|e| ZoneRow {
                id: e.id,
                name: e.zone.name.clone(),
                lat: e.zone.center.lat,
                lng: e.zone.center.lon,
                radius: e.zone.radius_km,
            })
            .collect()
    }

    pub fn circles(&self) -> Vec<Circle> {
        self.entries
            .iter()
            .map(|e| Circle {
                id: e.id,
                center: e.zone.center,
                radius_m: e.zone.radius_km * 1000.0,
            })
            .collect()
    }

    /// The zones in order, checked for export.
    pub fn to_zones(&self) -> Result<Vec<Zone>> {
        let zones: Vec<Zone> = self.entries.iter().map(|e| e.zone.clone()).collect();
        validate_zones(&zones)?;
        Ok(zones)
    }
}

/// At least one zone, unique names, sane geometry.
pub fn validate_zones(zones: &[Zone]) -> Result<()> {
    if zones.is_empty() {
        return Err(Error::invalid_selection("at least one zone is required"));
    }
    let mut seen = HashSet::new();
    for zone in zones {
        if let Some(problem) = zone.problem() {
            return Err(Error::invalid_selection(problem));
        }
        if !seen.insert(zone.name.as_str()) {
            return Err(Error::invalid_selection(format!(
                "zone name '{}' is used more than once",
                zone.name
            )));
        }
    }
    Ok(())
}
