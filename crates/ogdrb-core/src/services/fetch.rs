//! Downloading repeaters into the local store.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::api::{ApiError, RepeaterSource};
use crate::cache::{RepeaterStore, StoreQuery};
use crate::config::Config;
use crate::error::Result;
use crate::models::{ExportQuery, Repeater, RepeaterId};

use super::split::build_export_queries;

/// Fans downloads out over the split queries and upserts the merged result.
#[derive(Clone)]
pub struct RepeaterFetcher {
    source: Arc<dyn RepeaterSource>,
    store: Arc<RepeaterStore>,
    download_timeout: Duration,
    max_concurrent: usize,
}

impl RepeaterFetcher {
    pub fn new(source: Arc<dyn RepeaterSource>, store: Arc<RepeaterStore>) -> Self {
        let defaults = Config::default();
        Self {
            source,
            store,
            download_timeout: defaults.download_timeout(),
            max_concurrent: defaults.max_concurrent_downloads,
        }
    }

    pub fn from_config(
        source: Arc<dyn RepeaterSource>,
        store: Arc<RepeaterStore>,
        config: &Config,
    ) -> Self {
        Self::new(source, store)
            .with_download_timeout(config.download_timeout())
            .with_max_concurrent(config.max_concurrent_downloads)
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn store(&self) -> &Arc<RepeaterStore> {
        &self.store
    }

    /// Download everything the selection covers, store it, and return the
    /// stored repeaters that match the selection (including ones kept from
    /// earlier downloads).
    ///
    /// Every split download runs to completion; if any failed, the first
    /// failure in split order is returned and the store is left untouched.
    pub async fn fetch_and_store(
        &self,
        export: &ExportQuery,
        us_state_ids: &BTreeSet<String>,
    ) -> Result<Vec<Repeater>> {
        let queries = build_export_queries(export, us_state_ids)?;
        info!(
            queries = queries.len(),
            concurrency = self.max_concurrent,
            "Downloading repeaters"
        );

        let results: Vec<Result<Vec<Repeater>, ApiError>> = stream::iter(queries.iter())
            .map(|query| self.download_one(query))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut batches = Vec::with_capacity(results.len());
        for result in results {
            batches.push(result?);
        }

        let downloaded: usize = batches.iter().map(Vec::len).sum();
        let unique = dedupe_last_wins(batches);
        info!(downloaded, unique = unique.len(), "Merged repeater downloads");

        self.store.upsert(unique)?;

        let region = export.region_filter(us_state_ids);
        Ok(self.store.query(&StoreQuery::region(region))?)
    }

    async fn download_one(&self, query: &ExportQuery) -> Result<Vec<Repeater>, ApiError> {
        let started = std::time::Instant::now();
        let result = match tokio::time::timeout(self.download_timeout, self.source.download(query)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.download_timeout.as_secs())),
        };
        match result {
            Ok(ref batch) => debug!(
                countries = query.countries.len(),
                states = ?query.state_ids,
                count = batch.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Download complete"
            ),
            Err(ref e) => warn!(states = ?query.state_ids, error = %e, "Download failed"),
        }
        result
    }
}

/// Flatten batches, keeping one record per natural key. A later record
/// replaces an earlier one in place, so the first-seen order is kept.
pub fn dedupe_last_wins(batches: impl IntoIterator<Item = Vec<Repeater>>) -> Vec<Repeater> {
    let mut index: HashMap<RepeaterId, usize> = HashMap::new();
    let mut unique: Vec<Repeater> = Vec::new();
    for repeater in batches.into_iter().flatten() {
        match index.get(&repeater.id()) {
            Some(&slot) => unique[slot] = repeater,
            None => {
                index.insert(repeater.id(), unique.len());
                unique.push(repeater);
            }
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{Country, US_COUNTRY_NAME};
    use crate::testing::{FakeSource, RepeaterBuilder};

    fn fetcher(source: FakeSource) -> (RepeaterFetcher, Arc<FakeSource>) {
        let source = Arc::new(source);
        let store = Arc::new(RepeaterStore::in_memory());
        (RepeaterFetcher::new(source.clone(), store), source)
    }

    fn states(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupe_last_wins() {
        let a1 = RepeaterBuilder::new(1).city("First").build();
        let b = RepeaterBuilder::new(2).build();
        let a2 = RepeaterBuilder::new(1).city("Second").build();

        let unique = dedupe_last_wins([vec![a1, b.clone()], vec![a2.clone()]]);
        assert_eq!(unique, vec![a2, b]);
    }

    #[tokio::test]
    async fn test_fetch_deduplicates_and_stores() {
        let canada = Country::new("CA", "Canada");
        let vancouver = RepeaterBuilder::new(123)
            .country("Canada")
            .state_id("BC")
            .city("Vancouver")
            .build();
        let toronto = RepeaterBuilder::new(456)
            .country("Canada")
            .state_id("ON")
            .city("Toronto")
            .build();
        let source = FakeSource::new().with_batch(
            "CA|",
            vec![vancouver.clone(), vancouver.clone(), toronto.clone()],
        );
        let (fetcher, source) = fetcher(source);

        let result = fetcher
            .fetch_and_store(&ExportQuery::new([canada]), &BTreeSet::new())
            .await
            .expect("fetch");

        assert_eq!(source.calls(), 1);
        assert_eq!(fetcher.store().len().expect("len"), 2);
        assert_eq!(result, vec![vancouver, toronto]);
    }

    #[tokio::test]
    async fn test_duplicate_keys_across_batches_keep_later_record() {
        let old = RepeaterBuilder::new(7).state_id("06").city("Old").build();
        let new = RepeaterBuilder::new(7).state_id("06").city("New").build();
        let source = FakeSource::new()
            .with_batch("US|06", vec![old])
            .with_batch("US|36", vec![new.clone()]);
        let (fetcher, _) = fetcher(source);

        let result = fetcher
            .fetch_and_store(&ExportQuery::new([Country::united_states()]), &states(&["06", "36"]))
            .await
            .expect("fetch");

        assert_eq!(result, vec![new]);
    }

    #[tokio::test]
    async fn test_us_without_states_fails_before_download() {
        let (fetcher, source) = fetcher(FakeSource::new());
        let err = fetcher
            .fetch_and_store(&ExportQuery::new([Country::united_states()]), &BTreeSet::new())
            .await
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidSelection(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_surfaces_and_leaves_store_untouched() {
        let source = FakeSource::new()
            .with_batch("US|06", vec![RepeaterBuilder::new(1).state_id("06").build()])
            .with_failure("US|36", "boom");
        let (fetcher, source) = fetcher(source);

        let err = fetcher
            .fetch_and_store(&ExportQuery::new([Country::united_states()]), &states(&["06", "36"]))
            .await
            .expect_err("should fail");

        assert!(matches!(err, Error::NetworkFailure(ApiError::ServerError(ref m)) if m == "boom"));
        assert!(err.is_retryable());
        // The sibling download still ran.
        assert_eq!(source.calls(), 2);
        assert!(fetcher.store().is_empty().expect("is_empty"));
    }

    #[tokio::test]
    async fn test_slow_download_times_out() {
        let source = FakeSource::new().with_delay(Duration::from_millis(500));
        let (fetcher, _) = fetcher(source);
        let fetcher = fetcher.with_download_timeout(Duration::from_millis(20));

        let err = fetcher
            .fetch_and_store(&ExportQuery::new([Country::new("CA", "Canada")]), &BTreeSet::new())
            .await
            .expect_err("should time out");
        assert!(matches!(err, Error::NetworkFailure(ApiError::Timeout(_))));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_cancelled_fetch_does_not_touch_store() {
        let source = FakeSource::new()
            .with_batch("CA|", vec![RepeaterBuilder::new(1).country("Canada").build()])
            .with_delay(Duration::from_millis(500));
        let (fetcher, _) = fetcher(source);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            fetcher.fetch_and_store(&ExportQuery::new([Country::new("CA", "Canada")]), &BTreeSet::new()),
        )
        .await;

        assert!(abandoned.is_err());
        assert!(fetcher.store().is_empty().expect("is_empty"));
    }

    #[tokio::test]
    async fn test_returns_stored_records_for_narrower_selection() {
        let pa = RepeaterBuilder::new(1).state_id("42").build();
        let ny = RepeaterBuilder::new(2).state_id("36").build();
        let source = FakeSource::new()
            .with_batch("US|42", vec![pa.clone()])
            .with_batch("US|36", vec![ny]);
        let (fetcher, _) = fetcher(source);
        let usa = ExportQuery::new([Country::united_states()]);

        fetcher.fetch_and_store(&usa, &states(&["36", "42"])).await.expect("fetch");

        // A narrower second call reuses what is already stored.
        let narrowed = fetcher.fetch_and_store(&usa, &states(&["42"])).await.expect("fetch");
        assert_eq!(narrowed, vec![pa]);
        assert_eq!(fetcher.store().len().expect("len"), 2);
        assert!(narrowed.iter().all(|r| r.country == US_COUNTRY_NAME));
    }
}
