//! Search execution and orchestration

use super::models::SearchQuery;
use crate::engines::{Engine, EngineError, EngineRegistry, RequestParams};
use crate::error::SearchError;
use crate::results::{Aggregator, Category, Ranker, SearchResult, DEFAULT_KEY_FIELDS};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

type EngineOutcome = (Arc<dyn Engine>, Result<Vec<SearchResult>, EngineError>);

/// Upper bound on concurrent engine calls for one search.
///
/// One call per provider group, scaled down to roughly one call per ten
/// requested results plus one.
pub fn max_workers(unique_providers: usize, max_results: Option<usize>) -> usize {
    match max_results {
        Some(n) if n > 0 => unique_providers.min((n + 9) / 10 + 1),
        _ => unique_providers,
    }
}

/// Search executor that fans a query out to engines in bounded waves
pub struct Search {
    /// Engine registry
    registry: Arc<EngineRegistry>,
    /// How long one wave waits for its calls
    timeout: Duration,
    ranker: Ranker,
}

/// Mutable state of one search
struct Dispatch {
    aggregator: Aggregator,
    seen_providers: HashSet<String>,
    last_error: Option<EngineError>,
}

impl Dispatch {
    /// Record one finished call. Returns `true` if it failed.
    fn collect(&mut self, joined: Result<EngineOutcome, JoinError>) -> Result<bool, SearchError> {
        match joined {
            Ok((engine, Ok(results))) => {
                debug!("Engine {} returned {} results", engine.name(), results.len());
                if !results.is_empty() {
                    self.aggregator.extend(results)?;
                    self.seen_providers.insert(engine.provider().to_string());
                }
                Ok(false)
            }
            Ok((engine, Err(err))) => {
                info!("Error in engine {}: {}", engine.name(), err);
                self.last_error = Some(err);
                Ok(true)
            }
            Err(err) => {
                error!("Engine task failed: {}", err);
                self.last_error = Some(EngineError::Other(err.to_string()));
                Ok(true)
            }
        }
    }
}

impl Search {
    /// Create a new search executor
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT),
            ranker: Ranker::default(),
        }
    }

    /// Set the per-wave timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub async fn text(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.search(Category::Text, query).await
    }

    pub async fn images(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.search(Category::Images, query).await
    }

    pub async fn news(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.search(Category::News, query).await
    }

    pub async fn videos(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.search(Category::Videos, query).await
    }

    pub async fn books(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.search(Category::Books, query).await
    }

    /// Run `query` against the engines of `category`.
    ///
    /// Returns deduplicated, ranked results, at most `query.max_results` of
    /// them. Individual engine failures are logged; an error is returned only
    /// when nothing was found.
    pub async fn search(
        &self,
        category: Category,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let engines = self.registry.resolve(category, &query.backend)?;
        debug!(
            "Searching {} for {:?} with {} engines",
            category,
            query.query,
            engines.len()
        );

        let unique_providers = engines
            .iter()
            .map(|e| e.provider())
            .collect::<HashSet<_>>()
            .len();
        let max_workers = max_workers(unique_providers, query.max_results).max(1);
        let budget_met = |dispatch: &Dispatch| {
            query
                .max_results
                .map(|max| dispatch.aggregator.len() >= max)
                .unwrap_or(false)
        };

        let params = Arc::new(RequestParams::from(query));
        let mut dispatch = Dispatch {
            aggregator: Aggregator::new(DEFAULT_KEY_FIELDS)?,
            seen_providers: HashSet::new(),
            last_error: None,
        };
        // Dropping the set aborts whatever is still running
        let mut in_flight: JoinSet<EngineOutcome> = JoinSet::new();

        for (position, engine) in engines.iter().enumerate().map(|(i, e)| (i + 1, e)) {
            if dispatch.seen_providers.contains(engine.provider()) {
                debug!(
                    "Skipping engine {}: provider {} already answered",
                    engine.name(),
                    engine.provider()
                );
                continue;
            }

            // Calls left over from a failed wave still hold their slot
            while in_flight.len() >= max_workers {
                self.wave(&mut in_flight, &mut dispatch).await?;
            }
            if budget_met(&dispatch) {
                break;
            }

            let engine = engine.clone();
            let params = params.clone();
            debug!("Dispatching engine {}", engine.name());
            in_flight.spawn(async move {
                let result = engine.search(&params).await;
                (engine, result)
            });

            if in_flight.len() >= max_workers
                || position >= max_workers
                || position == engines.len()
            {
                self.wave(&mut in_flight, &mut dispatch).await?;
            }
            if budget_met(&dispatch) {
                break;
            }
        }

        while !in_flight.is_empty() && !budget_met(&dispatch) {
            self.wave(&mut in_flight, &mut dispatch).await?;
        }
        drop(in_flight);

        let mut results = self
            .ranker
            .rank(dispatch.aggregator.extract(), &query.query);
        if let Some(max) = query.max_results {
            results.truncate(max);
        }

        if results.is_empty() {
            return Err(SearchError::from_last_error(dispatch.last_error));
        }
        Ok(results)
    }

    /// Wait for in-flight calls until all finish, one fails or the timeout
    /// elapses.
    ///
    /// After a failure, calls that already finished are collected and the
    /// rest stay in flight. On timeout every remaining call is aborted.
    async fn wave(
        &self,
        in_flight: &mut JoinSet<EngineOutcome>,
        dispatch: &mut Dispatch,
    ) -> Result<(), SearchError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match timeout_at(deadline, in_flight.join_next()).await {
                Ok(None) => return Ok(()),
                Ok(Some(joined)) => {
                    if dispatch.collect(joined)? {
                        while let Some(joined) = in_flight.try_join_next() {
                            dispatch.collect(joined)?;
                        }
                        return Ok(());
                    }
                }
                Err(_) => {
                    warn!(
                        "{} engine calls timed out after {:?}",
                        in_flight.len(),
                        self.timeout
                    );
                    in_flight.shutdown().await;
                    dispatch.last_error = Some(EngineError::Timeout);
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::TextResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    struct MockEngine {
        name: String,
        provider: String,
        delay: Duration,
        outcome: Result<Vec<SearchResult>, EngineError>,
        calls: Arc<AtomicUsize>,
        gauge: Arc<Gauge>,
    }

    impl MockEngine {
        fn new(name: &str, provider: &str) -> Self {
            Self {
                name: name.to_string(),
                provider: provider.to_string(),
                delay: Duration::ZERO,
                outcome: Ok(Vec::new()),
                calls: Arc::new(AtomicUsize::new(0)),
                gauge: Arc::new(Gauge::default()),
            }
        }

        fn results(mut self, results: Vec<SearchResult>) -> Self {
            self.outcome = Ok(results);
            self
        }

        fn fails(mut self, err: EngineError) -> Self {
            self.outcome = Err(err);
            self
        }

        fn delay(mut self, millis: u64) -> Self {
            self.delay = Duration::from_millis(millis);
            self
        }

        fn gauge(mut self, gauge: &Arc<Gauge>) -> Self {
            self.gauge = gauge.clone();
            self
        }

        fn calls(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl Engine for MockEngine {
        fn name(&self) -> &str {
            &self.name
        }

        fn category(&self) -> Category {
            Category::Text
        }

        fn provider(&self) -> &str {
            &self.provider
        }

        async fn search(&self, _params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);
            sleep(self.delay).await;
            self.gauge.current.fetch_sub(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn text(href: &str, title: &str, body: &str) -> SearchResult {
        let mut r = TextResult::new();
        r.set_href(href).set_title(title).set_body(body);
        r.into()
    }

    fn pages(prefix: &str, n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| text(&format!("{}.com/{}", prefix, i), "page", ""))
            .collect()
    }

    fn search_with(engines: Vec<MockEngine>) -> Search {
        let mut registry = EngineRegistry::new();
        for engine in engines {
            registry.register_engine(Arc::new(engine));
        }
        Search::new(Arc::new(registry)).with_timeout(Duration::from_millis(300))
    }

    fn links(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.link()).collect()
    }

    #[test]
    fn test_max_workers() {
        assert_eq!(max_workers(5, Some(10)), 2);
        assert_eq!(max_workers(5, Some(11)), 3);
        assert_eq!(max_workers(2, Some(100)), 2);
        assert_eq!(max_workers(7, None), 7);
        assert_eq!(max_workers(7, Some(0)), 7);
    }

    #[tokio::test]
    async fn test_empty_query_dispatches_nothing() {
        let engine = MockEngine::new("a", "g1").results(pages("a", 1));
        let calls = engine.calls();
        let search = search_with(vec![engine]);

        let err = assert_err!(search.text(&SearchQuery::new("  ")).await);
        assert!(matches!(err, SearchError::InvalidQuery));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skips_answered_provider_group() {
        let p1 = MockEngine::new("p1", "g1").results(vec![text("a.com/1", "Python Tutorial", "intro")]);
        let p2 = MockEngine::new("p2", "g2").results(vec![text("wikipedia.org/Python", "Python", "...")]);
        let p3 = MockEngine::new("p3", "g1").results(vec![text(
            "a.com/2",
            "Other",
            "python install guide",
        )]);
        let p3_calls = p3.calls();
        let search = search_with(vec![p1, p2, p3]);

        let query = SearchQuery::new("python tutorial").with_backend("p1,p2,p3");
        let results = assert_ok!(search.text(&query).await);

        assert_eq!(links(&results), vec!["wikipedia.org/Python", "a.com/1"]);
        assert_eq!(p3_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_max_workers() {
        let gauge = Arc::new(Gauge::default());
        let engines: Vec<MockEngine> = (0..6)
            .map(|i| {
                MockEngine::new(&format!("e{}", i), &format!("g{}", i))
                    .results(pages(&format!("e{}", i), 1))
                    .delay(30)
                    .gauge(&gauge)
            })
            .collect();
        let calls: Vec<_> = engines.iter().map(MockEngine::calls).collect();
        let search = search_with(engines);

        // 20 results allow ceil(20 / 10) + 1 = 3 concurrent calls
        let query = SearchQuery::new("rust")
            .with_backend("e0,e1,e2,e3,e4,e5")
            .with_max_results(20);
        let results = search.text(&query).await.unwrap();

        assert_eq!(results.len(), 6);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    }

    #[tokio::test]
    async fn test_stops_once_budget_met() {
        let engines: Vec<MockEngine> = (0..5)
            .map(|i| MockEngine::new(&format!("e{}", i), &format!("g{}", i)).results(pages(&format!("e{}", i), 10)))
            .collect();
        let calls: Vec<_> = engines.iter().map(MockEngine::calls).collect();
        let search = search_with(engines);

        let query = SearchQuery::new("rust")
            .with_backend("e0,e1,e2,e3,e4")
            .with_max_results(10);
        let results = search.text(&query).await.unwrap();

        assert_eq!(results.len(), 10);
        let total: usize = calls.iter().map(|c| c.load(Ordering::SeqCst)).sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_partial_failure_is_invisible() {
        let broken = MockEngine::new("broken", "g1").fails(EngineError::Http(500));
        let slow = MockEngine::new("slow", "g2").results(pages("slow", 3)).delay(50);
        let search = search_with(vec![broken, slow]);

        let query = SearchQuery::new("rust").with_backend("broken,slow");
        let results = search.text(&query).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_all_failed_is_no_results() {
        let a = MockEngine::new("a", "g1").fails(EngineError::TooManyRequests);
        let b = MockEngine::new("b", "g2").fails(EngineError::Http(500));
        let search = search_with(vec![a, b]);

        let err = search
            .text(&SearchQuery::new("rust").with_backend("a,b"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NoResults { source: Some(_) }));
    }

    #[tokio::test]
    async fn test_empty_answers_are_no_results_without_cause() {
        let search = search_with(vec![MockEngine::new("a", "g1")]);
        let err = search.text(&SearchQuery::new("rust")).await.unwrap_err();
        assert!(matches!(err, SearchError::NoResults { source: None }));
    }

    #[tokio::test]
    async fn test_timeout_keeps_fast_results() {
        let fast = MockEngine::new("fast", "g1").results(pages("fast", 2));
        let stuck = MockEngine::new("stuck", "g2").results(pages("stuck", 2)).delay(5_000);
        let search = search_with(vec![fast, stuck]);

        let query = SearchQuery::new("rust").with_backend("fast,stuck");
        let results = search.text(&query).await.unwrap();
        assert_eq!(links(&results), vec!["fast.com/0", "fast.com/1"]);
    }

    #[tokio::test]
    async fn test_everything_timed_out() {
        let stuck = MockEngine::new("stuck", "g1").results(pages("stuck", 2)).delay(5_000);
        let search = search_with(vec![stuck]);

        let err = assert_err!(search.text(&SearchQuery::new("rust")).await);
        assert!(matches!(err, SearchError::Timeout(EngineError::Timeout)));
    }

    #[tokio::test]
    async fn test_empty_answer_does_not_claim_provider() {
        let empty = MockEngine::new("empty", "shared");
        let full = MockEngine::new("full", "shared").results(pages("full", 1));
        let full_calls = full.calls();
        let search = search_with(vec![empty, full]);

        let query = SearchQuery::new("rust").with_backend("empty,full");
        let results = search.text(&query).await.unwrap();
        assert_eq!(links(&results), vec!["full.com/0"]);
        assert_eq!(full_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicates_rank_by_frequency() {
        let a = MockEngine::new("a", "g1").results(vec![
            text("only-a.com", "page", ""),
            text("both.com", "page", "short"),
        ]);
        let b = MockEngine::new("b", "g2").results(vec![text("both.com", "page", "a longer body")]);
        let search = search_with(vec![a, b]);

        let query = SearchQuery::new("zz").with_backend("a,b");
        let results = search.text(&query).await.unwrap();
        assert_eq!(links(&results), vec!["both.com", "only-a.com"]);
        assert_eq!(results[0].body(), "a longer body");
    }
}
