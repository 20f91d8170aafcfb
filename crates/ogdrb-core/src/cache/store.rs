use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geo::BoundingBox;
use crate::models::{RegionFilter, Repeater, RepeaterId};
use crate::services::compat::is_compatible;

/// Consider the store stale after a week.
/// Repeater listings change slowly; a weekly refresh catches new entries.
const STORE_STALE_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > STORE_STALE_MINUTES
    }
}

/// Predicates applied by [`RepeaterStore::query`].
#[derive(Debug, Clone, Default)]
pub struct StoreQuery {
    /// Only repeaters with a position inside this box.
    pub bbox: Option<BoundingBox>,
    pub region: RegionFilter,
    pub compatible_only: bool,
}

impl StoreQuery {
    pub fn region(region: RegionFilter) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    pub fn within(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn compatible(mut self) -> Self {
        self.compatible_only = true;
        self
    }

    pub fn matches(&self, repeater: &Repeater) -> bool {
        if let Some(bbox) = self.bbox {
            match repeater.position {
                Some(position) if bbox.contains(position) => {}
                _ => return false,
            }
        }
        if self.compatible_only && !is_compatible(repeater) {
            return false;
        }
        self.region.matches(repeater)
    }
}

struct StoreState {
    repeaters: BTreeMap<RepeaterId, Repeater>,
    updated_at: Option<DateTime<Utc>>,
}

/// Local repeater store keyed by natural id.
///
/// Shared behind an `Arc`. `upsert` applies a whole batch under the write
/// lock, persisting it before it becomes visible, so readers see either the
/// old or the new contents.
pub struct RepeaterStore {
    path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl RepeaterStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreState {
                repeaters: BTreeMap::new(),
                updated_at: None,
            }),
        }
    }

    /// Store persisted as JSON at `path`, loading existing contents if present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (repeaters, updated_at) = match Self::load(&path)? {
            Some(cached) => {
                let map: BTreeMap<RepeaterId, Repeater> =
                    cached.data.into_iter().map(|r| (r.id(), r)).collect();
                (map, Some(cached.cached_at))
            }
            None => (BTreeMap::new(), None),
        };
        info!(path = %path.display(), count = repeaters.len(), "Opened repeater store");

        Ok(Self {
            path: Some(path),
            state: RwLock::new(StoreState {
                repeaters,
                updated_at,
            }),
        })
    }

    fn load(path: &Path) -> Result<Option<CachedData<Vec<Repeater>>>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read repeater store: {}", path.display()))?;

        let cached: CachedData<Vec<Repeater>> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse repeater store: {}", path.display()))?;

        Ok(Some(cached))
    }

    /// Write through a temporary file and rename, so a crash never leaves a
    /// half-written store behind.
    fn save(path: &Path, cached: &CachedData<Vec<&Repeater>>) -> Result<()> {
        let contents = serde_json::to_string(cached)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write repeater store: {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace repeater store: {}", path.display()))?;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| anyhow::anyhow!("Repeater store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| anyhow::anyhow!("Repeater store lock poisoned"))
    }

    /// Insert or replace repeaters by natural key, all or nothing.
    /// Later items win over earlier items with the same key.
    pub fn upsert(&self, repeaters: impl IntoIterator<Item = Repeater>) -> Result<usize> {
        let mut state = self.write()?;

        let mut next = state.repeaters.clone();
        let mut count = 0;
        for repeater in repeaters {
            next.insert(repeater.id(), repeater);
            count += 1;
        }

        let now = Utc::now();
        if let Some(ref path) = self.path {
            let cached = CachedData {
                data: next.values().collect::<Vec<_>>(),
                cached_at: now,
            };
            Self::save(path, &cached)?;
        }

        state.repeaters = next;
        state.updated_at = Some(now);
        debug!(upserted = count, total = state.repeaters.len(), "Upserted repeaters");
        Ok(count)
    }

    /// Repeaters matching every predicate of `query`, ordered by natural key.
    pub fn query(&self, query: &StoreQuery) -> Result<Vec<Repeater>> {
        let state = self.read()?;
        Ok(state
            .repeaters
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    pub fn get(&self, id: &RepeaterId) -> Result<Option<Repeater>> {
        Ok(self.read()?.repeaters.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.repeaters.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Age of the last completed upsert, if any.
    pub fn freshness(&self) -> Result<Option<CachedData<usize>>> {
        let state = self.read()?;
        Ok(state.updated_at.map(|cached_at| CachedData {
            data: state.repeaters.len(),
            cached_at,
        }))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

// ============================================================================
// Tests
// ============================================================================
