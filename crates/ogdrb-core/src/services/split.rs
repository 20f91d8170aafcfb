//! Splitting export queries so US requests go out one state at a time.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::models::{Country, ExportQuery};

/// Build the download queries for an export.
///
/// Without the US the query is returned unchanged. With the US, at least one
/// state must be selected; the result is one query for every other country
/// (if any) followed by one US query per state, ordered by state id.
pub fn build_export_queries(
    export: &ExportQuery,
    us_state_ids: &BTreeSet<String>,
) -> Result<Vec<ExportQuery>> {
    let Some(us) = export.countries.iter().find(|c| c.is_united_states()) else {
        return Ok(vec![export.clone()]);
    };

    if us_state_ids.is_empty() {
        return Err(Error::invalid_selection(
            "US states must be selected when US is in countries",
        ));
    }

    let mut queries = Vec::with_capacity(us_state_ids.len() + 1);

    let others: BTreeSet<Country> = export
        .countries
        .iter()
        .filter(|c| !c.is_united_states())
        .cloned()
        .collect();
    if !others.is_empty() {
        queries.push(ExportQuery {
            countries: others,
            state_ids: BTreeSet::new(),
        });
    }

    // BTreeSet iteration is already sorted by state id.
    queries.extend(us_state_ids.iter().map(|state_id| ExportQuery {
        countries: BTreeSet::from([us.clone()]),
        state_ids: BTreeSet::from([state_id.clone()]),
    }));

    Ok(queries)
}
