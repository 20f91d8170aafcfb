//! End-to-end export: selection and zones in, codeplug out.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::cache::RepeaterStore;
use crate::convert::organize_with_limits;
use crate::error::{Error, Result};
use crate::models::{Codeplug, ExportQuery, Limits, Zone};
use crate::services::{build_export_queries, RepeaterFetcher, ZoneResolver};
use crate::zones::validate_zones;

pub struct Exporter {
    fetcher: RepeaterFetcher,
    resolver: ZoneResolver,
    limits: Limits,
}

impl Exporter {
    pub fn new(fetcher: RepeaterFetcher) -> Self {
        let resolver = ZoneResolver::new(Arc::clone(fetcher.store()));
        Self {
            fetcher,
            resolver,
            limits: Limits::OPENGD77,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &Arc<RepeaterStore> {
        self.fetcher.store()
    }

    /// Check everything the user controls before any download starts.
    pub fn validate(
        zones: &[Zone],
        export: &ExportQuery,
        us_state_ids: &BTreeSet<String>,
    ) -> Result<()> {
        if export.countries.is_empty() {
            return Err(Error::invalid_selection("at least one country is required"));
        }
        validate_zones(zones)?;
        build_export_queries(export, us_state_ids)?;
        Ok(())
    }

    /// Download the selection (unless `offline`), then build the codeplug
    /// for `zones` from the store.
    pub async fn export(
        &self,
        zones: &[Zone],
        export: &ExportQuery,
        us_state_ids: &BTreeSet<String>,
        offline: bool,
    ) -> Result<Codeplug> {
        Self::validate(zones, export, us_state_ids)?;

        if offline {
            info!("Offline export, using stored repeaters");
        } else {
            self.fetcher.fetch_and_store(export, us_state_ids).await?;
        }

        let region = export.region_filter(us_state_ids);
        let resolved = self.resolver.resolve(zones, &region)?;
        Ok(organize_with_limits(&resolved, &self.limits))
    }
}
