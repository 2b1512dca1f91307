use std::sync::Arc;

use crate::domain::Article;
use crate::paging::{LoadParams, LoadResult, PagingSource, STARTING_PAGE_INDEX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoading { end_of_pagination_reached: bool },
    Loading,
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_end_of_pagination(&self) -> bool {
        matches!(
            self,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        )
    }
}

impl Default for LoadState {
    fn default() -> Self {
        LoadState::NotLoading {
            end_of_pagination_reached: false,
        }
    }
}

/// Load states of the initial/refresh load and of forward appends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedLoadStates {
    pub refresh: LoadState,
    pub append: LoadState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Refresh,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub kind: LoadKind,
    pub params: LoadParams,
    /// Unique per pager; two requests for the same page still differ
    pub seq: u64,
}

/// Accumulates pages from one [`PagingSource`].
///
/// The pager is a plain state machine: `begin_*` hands out a [`LoadRequest`],
/// the caller runs it against [`Pager::source`] and feeds the outcome back
/// through [`Pager::apply`]. Only one request is outstanding at a time.
pub struct Pager {
    source: Arc<dyn PagingSource>,
    page_size: u32,
    items: Vec<Article>,
    next_key: Option<u32>,
    states: CombinedLoadStates,
    in_flight: Option<LoadRequest>,
    failed: Option<LoadRequest>,
    refreshed: bool,
    last_seq: u64,
}

impl Pager {
    pub fn new(source: Arc<dyn PagingSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            items: Vec::new(),
            next_key: None,
            states: CombinedLoadStates::default(),
            in_flight: None,
            failed: None,
            refreshed: false,
            last_seq: 0,
        }
    }

    pub fn source(&self) -> Arc<dyn PagingSource> {
        self.source.clone()
    }

    pub fn items(&self) -> &[Article] {
        &self.items
    }

    pub fn load_states(&self) -> &CombinedLoadStates {
        &self.states
    }

    /// Page the next append would request, `None` at the end of the data.
    pub fn next_key(&self) -> Option<u32> {
        self.next_key
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    fn next_seq(&mut self) -> u64 {
        self.last_seq += 1;
        self.last_seq
    }

    /// Restart from the refresh key (always page one).
    pub fn begin_refresh(&mut self) -> LoadRequest {
        let key = self.source.refresh_key().unwrap_or(STARTING_PAGE_INDEX);
        let request = LoadRequest {
            kind: LoadKind::Refresh,
            params: LoadParams {
                key: Some(key),
                load_size: self.page_size,
            },
            seq: self.next_seq(),
        };

        self.failed = None;
        self.in_flight = Some(request);
        self.states = CombinedLoadStates {
            refresh: LoadState::Loading,
            append: LoadState::default(),
        };
        request
    }

    /// Request the page after the last loaded one, if there is anything to load.
    pub fn begin_append(&mut self) -> Option<LoadRequest> {
        if !self.refreshed || self.in_flight.is_some() || self.failed.is_some() {
            return None;
        }

        let key = self.next_key?;
        let request = LoadRequest {
            kind: LoadKind::Append,
            params: LoadParams {
                key: Some(key),
                load_size: self.page_size,
            },
            seq: self.next_seq(),
        };

        self.in_flight = Some(request);
        self.states.append = LoadState::Loading;
        Some(request)
    }

    /// Re-issue the load that last failed, with the same key.
    pub fn begin_retry(&mut self) -> Option<LoadRequest> {
        if self.in_flight.is_some() {
            return None;
        }

        let failed = self.failed.take()?;
        let request = LoadRequest {
            seq: self.next_seq(),
            ..failed
        };
        self.in_flight = Some(request);
        match request.kind {
            LoadKind::Refresh => self.states.refresh = LoadState::Loading,
            LoadKind::Append => self.states.append = LoadState::Loading,
        }
        Some(request)
    }

    /// Fold a load outcome into the pager. Returns `false` for a request that
    /// is no longer outstanding.
    pub fn apply(&mut self, request: LoadRequest, result: LoadResult) -> bool {
        if self.in_flight.map(|r| r.seq) != Some(request.seq) {
            tracing::debug!("Dropping stale load result for {:?}", request);
            return false;
        }
        self.in_flight = None;

        match result {
            LoadResult::Page(page) => {
                self.next_key = page.next_key;
                let end_reached = page.next_key.is_none();

                match request.kind {
                    LoadKind::Refresh => {
                        self.items = page.data;
                        self.refreshed = true;
                        self.states.refresh = LoadState::default();
                    }
                    LoadKind::Append => {
                        self.items.extend(page.data);
                    }
                }

                self.states.append = LoadState::NotLoading {
                    end_of_pagination_reached: end_reached,
                };
                tracing::debug!(
                    "Pager holds {} items, next key {:?}",
                    self.items.len(),
                    self.next_key
                );
            }
            LoadResult::Error(message) => {
                tracing::warn!("Page load failed: {}", message);
                self.failed = Some(request);
                match request.kind {
                    LoadKind::Refresh => self.states.refresh = LoadState::Error(message),
                    LoadKind::Append => self.states.append = LoadState::Error(message),
                }
            }
        }

        true
    }

    /// Run a request to completion against the source.
    pub async fn load(&mut self, request: LoadRequest) -> bool {
        let result = self.source.load(request.params).await;
        self.apply(request, result)
    }

    pub async fn refresh(&mut self) {
        let request = self.begin_refresh();
        self.load(request).await;
    }

    /// Load the next page. Returns `false` when nothing was requested.
    pub async fn load_more(&mut self) -> bool {
        match self.begin_append() {
            Some(request) => self.load(request).await,
            None => false,
        }
    }

    pub async fn retry(&mut self) -> bool {
        match self.begin_retry() {
            Some(request) => self.load(request).await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::source::tests::FakeNewsApi;
    use crate::paging::{ArticlePagingSource, ArticleQuery, Page};
    use reqwest::StatusCode;

    fn pager_over(api: FakeNewsApi) -> (Arc<FakeNewsApi>, Pager) {
        let api = Arc::new(api);
        let source = ArticlePagingSource::new(
            api.clone(),
            ArticleQuery::Headlines {
                country: "us".into(),
            },
        );
        (api, Pager::new(Arc::new(source), 20))
    }

    #[tokio::test]
    async fn test_refresh_then_append_until_end() {
        let (api, mut pager) = pager_over(FakeNewsApi::with_pages(&[(1, 20), (2, 20), (3, 5)]));

        pager.refresh().await;
        assert_eq!(pager.items().len(), 20);
        assert_eq!(pager.next_key(), Some(2));

        assert!(pager.load_more().await);
        assert!(pager.load_more().await);
        assert_eq!(pager.items().len(), 45);
        assert_eq!(pager.next_key(), Some(4));

        // Page four is empty: end of data
        assert!(pager.load_more().await);
        assert_eq!(pager.items().len(), 45);
        assert_eq!(pager.next_key(), None);
        assert!(pager.load_states().append.is_end_of_pagination());

        assert!(!pager.load_more().await);
        let pages: Vec<u32> = api.calls().iter().map(|c| c.2).collect();
        assert_eq!(pages, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_items_keep_page_order() {
        let (_, mut pager) = pager_over(FakeNewsApi::with_pages(&[(1, 2), (2, 2)]));
        pager.refresh().await;
        pager.load_more().await;

        let urls: Vec<&str> = pager.items().iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://x/us/1/0", "https://x/us/1/1", "https://x/us/2/0", "https://x/us/2/1"]
        );
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let (_, mut pager) = pager_over(FakeNewsApi::default());
        pager.refresh().await;

        assert!(pager.items().is_empty());
        assert_eq!(pager.load_states().refresh, LoadState::default());
        assert!(pager.load_states().append.is_end_of_pagination());
    }

    #[tokio::test]
    async fn test_refresh_error_and_retry_same_key() {
        let (api, mut pager) = pager_over(FakeNewsApi {
            status: Some(StatusCode::TOO_MANY_REQUESTS),
            ..Default::default()
        });

        pager.refresh().await;
        match &pager.load_states().refresh {
            LoadState::Error(message) => assert!(message.contains("429")),
            other => panic!("expected error, got {:?}", other),
        }
        assert!(!pager.load_more().await);

        assert!(pager.retry().await);
        let pages: Vec<u32> = api.calls().iter().map(|c| c.2).collect();
        assert_eq!(pages, vec![1, 1]);
    }

    #[test]
    fn test_append_error_is_retried_at_same_cursor() {
        let (_, mut pager) = pager_over(FakeNewsApi::default());

        let refresh = pager.begin_refresh();
        pager.apply(
            refresh,
            LoadResult::Page(Page {
                data: vec![Article::new("https://x/1")],
                prev_key: None,
                next_key: Some(2),
            }),
        );

        let append = pager.begin_append().unwrap();
        assert_eq!(append.params.key, Some(2));
        pager.apply(append, LoadResult::Error("timeout".into()));
        assert_eq!(pager.load_states().append, LoadState::Error("timeout".into()));
        assert_eq!(pager.begin_append(), None);

        let retry = pager.begin_retry().unwrap();
        assert_eq!(retry.kind, append.kind);
        assert_eq!(retry.params, append.params);
        assert_ne!(retry.seq, append.seq);
        assert!(pager.load_states().append.is_loading());
        assert_eq!(pager.items().len(), 1);
    }

    #[test]
    fn test_single_flight() {
        let (_, mut pager) = pager_over(FakeNewsApi::default());
        assert_eq!(pager.begin_append(), None);

        let refresh = pager.begin_refresh();
        assert!(pager.is_loading());
        assert_eq!(pager.begin_append(), None);
        assert_eq!(pager.begin_retry(), None);
        assert_eq!(refresh.params.key, Some(STARTING_PAGE_INDEX));
    }

    #[test]
    fn test_stale_result_ignored() {
        let (_, mut pager) = pager_over(FakeNewsApi::default());
        let first = pager.begin_refresh();
        pager.apply(
            first,
            LoadResult::Page(Page {
                data: vec![Article::new("https://x/1")],
                prev_key: None,
                next_key: Some(2),
            }),
        );

        // Applying the same request twice must not duplicate items
        let applied = pager.apply(
            first,
            LoadResult::Page(Page {
                data: vec![Article::new("https://x/1")],
                prev_key: None,
                next_key: Some(2),
            }),
        );
        assert!(!applied);
        assert_eq!(pager.items().len(), 1);
    }

    fn single(url: &str) -> LoadResult {
        LoadResult::Page(Page {
            data: vec![Article::new(url)],
            prev_key: None,
            next_key: Some(2),
        })
    }

    #[test]
    fn test_refresh_over_refresh_keeps_latest() {
        let (_, mut pager) = pager_over(FakeNewsApi::default());
        let superseded = pager.begin_refresh();
        let latest = pager.begin_refresh();
        assert_eq!(superseded.params, latest.params);

        assert!(!pager.apply(superseded, single("https://x/stale")));
        assert!(pager.items().is_empty());
        assert!(pager.load_states().refresh.is_loading());

        assert!(pager.apply(latest, single("https://x/fresh")));
        let urls: Vec<&str> = pager.items().iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/fresh"]);
    }

    #[test]
    fn test_failed_request_not_applied_after_retry() {
        let (_, mut pager) = pager_over(FakeNewsApi::default());
        let first = pager.begin_refresh();
        pager.apply(first, LoadResult::Error("timeout".into()));

        let retry = pager.begin_retry().unwrap();
        assert!(!pager.apply(first, single("https://x/late")));
        assert!(pager.apply(retry, single("https://x/retry")));
        assert_eq!(pager.items()[0].url, "https://x/retry");
    }

    #[tokio::test]
    async fn test_refresh_restarts_at_page_one() {
        let (api, mut pager) = pager_over(FakeNewsApi::with_pages(&[(1, 1), (2, 1)]));
        pager.refresh().await;
        pager.load_more().await;
        assert_eq!(pager.items().len(), 2);

        pager.refresh().await;
        assert_eq!(pager.items().len(), 1);
        assert_eq!(pager.next_key(), Some(2));
        assert_eq!(api.calls().last().map(|c| c.2), Some(1));
    }
}
