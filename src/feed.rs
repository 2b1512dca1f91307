//! Background state holder for the article list screen.
//!
//! ```text
//! NewsFeed ──FeedCommand──▶ FeedTask (owns Pager) ──watch──▶ FeedSnapshot
//! ```
//!
//! Commands are handled one at a time by a single task. A new query drops
//! the in-flight request of the previous one, so a superseded response is
//! never applied. Dropping the [`NewsFeed`] handle aborts the task.

use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::{ApiEvent, Article};
use crate::paging::{CombinedLoadStates, LoadRequest, LoadResult, LoadState, Pager, PagingSource};
use crate::repository::Repository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    /// Replace the query and restart from page one. Blank means headlines.
    Search(String),
    /// Scrolled to the end of the list
    LoadMore,
    /// Repeat the load that failed
    Retry,
    /// Restart the current query from page one
    Refresh,
}

/// What the list screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub query: String,
    /// Bumped every time the query changes
    pub generation: u64,
    pub articles: Vec<Article>,
    pub load_states: CombinedLoadStates,
}

impl FeedSnapshot {
    /// Collapse the load states into the four UI states. `Success` always
    /// carries at least one article.
    pub fn event(&self) -> ApiEvent {
        match &self.load_states.refresh {
            LoadState::Loading => ApiEvent::Loading,
            LoadState::Error(message) => ApiEvent::Error(message.clone()),
            LoadState::NotLoading { .. } if self.articles.is_empty() => {
                if self.load_states.append.is_end_of_pagination() {
                    ApiEvent::Empty
                } else {
                    // Nothing loaded yet
                    ApiEvent::Loading
                }
            }
            LoadState::NotLoading { .. } => ApiEvent::Success(self.articles.clone()),
        }
    }

    pub fn is_appending(&self) -> bool {
        self.load_states.append.is_loading()
    }

    pub fn append_error(&self) -> Option<&str> {
        match &self.load_states.append {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Handle to the list screen's background task.
pub struct NewsFeed {
    tx: mpsc::Sender<FeedCommand>,
    snapshot: watch::Receiver<FeedSnapshot>,
    task: JoinHandle<()>,
}

impl NewsFeed {
    /// Spawn the task and start loading headlines.
    pub fn spawn(repository: Repository) -> Self {
        Self::spawn_with_query(repository, String::new())
    }

    pub fn spawn_with_query(repository: Repository, query: String) -> Self {
        let (tx, rx) = mpsc::channel(32);
        let (snapshot_tx, snapshot) = watch::channel(FeedSnapshot::default());

        let task = FeedTask {
            pager: repository.articles_pager(&query),
            repository,
            query,
            generation: 0,
            rx,
            snapshot_tx,
        };
        let task = tokio::spawn(task.run());

        Self { tx, snapshot, task }
    }

    pub async fn send(&self, command: FeedCommand) {
        if let Err(e) = self.tx.send(command).await {
            tracing::warn!("News feed task is gone: {}", e);
        }
    }

    /// Non-blocking variant for the UI loop. Commands are dropped when the
    /// queue is full.
    pub fn try_send(&self, command: FeedCommand) {
        if let Err(e) = self.tx.try_send(command) {
            tracing::warn!("Failed to queue feed command: {}", e);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }
}

impl Drop for NewsFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct InFlight {
    request: LoadRequest,
    future: BoxFuture<'static, LoadResult>,
}

enum Step {
    Loaded(LoadResult),
    Command(Option<FeedCommand>),
}

struct FeedTask {
    repository: Repository,
    pager: Pager,
    query: String,
    generation: u64,
    rx: mpsc::Receiver<FeedCommand>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
}

impl FeedTask {
    async fn run(mut self) {
        info!("News feed started");

        let request = self.pager.begin_refresh();
        let mut in_flight = Some(self.start(request));
        self.publish();

        loop {
            let step = match in_flight.as_mut() {
                Some(load) => tokio::select! {
                    result = &mut load.future => Step::Loaded(result),
                    command = self.rx.recv() => Step::Command(command),
                },
                None => Step::Command(self.rx.recv().await),
            };

            match step {
                Step::Loaded(result) => {
                    if let Some(load) = in_flight.take() {
                        self.pager.apply(load.request, result);
                        self.publish();
                    }
                }
                Step::Command(None) => break,
                Step::Command(Some(command)) => {
                    if let Some(next) = self.handle(command, in_flight.is_some()) {
                        // Replacing the slot drops a superseded request
                        in_flight = Some(next);
                    }
                    self.publish();
                }
            }
        }

        info!("News feed stopped");
    }

    /// Returns a load to start, if the command calls for one.
    fn handle(&mut self, command: FeedCommand, busy: bool) -> Option<InFlight> {
        debug!("Feed command {:?}", command);
        match command {
            FeedCommand::Search(query) => {
                let query = query.trim().to_string();
                self.generation += 1;
                self.pager = self.repository.articles_pager(&query);
                self.query = query;
                let request = self.pager.begin_refresh();
                Some(self.start(request))
            }
            FeedCommand::Refresh => {
                self.pager = self.repository.articles_pager(&self.query);
                let request = self.pager.begin_refresh();
                Some(self.start(request))
            }
            FeedCommand::LoadMore if !busy => {
                let request = self.pager.begin_append()?;
                Some(self.start(request))
            }
            FeedCommand::Retry if !busy => {
                let request = self.pager.begin_retry()?;
                Some(self.start(request))
            }
            FeedCommand::LoadMore | FeedCommand::Retry => None,
        }
    }

    fn start(&self, request: LoadRequest) -> InFlight {
        let source = self.pager.source();
        InFlight {
            request,
            future: Box::pin(async move { source.load(request.params).await }),
        }
    }

    fn publish(&self) {
        let snapshot = FeedSnapshot {
            query: self.query.clone(),
            generation: self.generation,
            articles: self.pager.items().to_vec(),
            load_states: self.pager.load_states().clone(),
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use tokio::sync::Notify;

    use super::*;
    use crate::app::Result;
    use crate::config::ApiConfig;
    use crate::fetcher::{ApiReply, NewsApi};
    use crate::paging::source::tests::FakeNewsApi;
    use crate::store::SqliteStore;

    fn repository(api: Arc<dyn NewsApi + Send + Sync>) -> Repository {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        Repository::new(api, store, &ApiConfig::default())
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<FeedSnapshot>, mut done: F) -> FeedSnapshot
    where
        F: FnMut(&FeedSnapshot) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let snapshot = rx.borrow_and_update();
                    if done(&*snapshot) {
                        return (*snapshot).clone();
                    }
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("snapshot never reached the expected state")
    }

    #[test]
    fn test_snapshot_event_mapping() {
        let mut snapshot = FeedSnapshot::default();
        snapshot.load_states.refresh = LoadState::Loading;
        assert_eq!(snapshot.event(), ApiEvent::Loading);

        snapshot.load_states.refresh = LoadState::Error("boom".into());
        assert_eq!(snapshot.event(), ApiEvent::Error("boom".into()));

        snapshot.load_states.refresh = LoadState::default();
        snapshot.load_states.append = LoadState::NotLoading {
            end_of_pagination_reached: true,
        };
        assert_eq!(snapshot.event(), ApiEvent::Empty);

        snapshot.articles = vec![Article::new("https://x/1")];
        assert_eq!(snapshot.event().articles().len(), 1);
    }

    #[test]
    fn test_unpublished_snapshot_is_loading() {
        assert_eq!(FeedSnapshot::default().event(), ApiEvent::Loading);

        let mut snapshot = FeedSnapshot::default();
        snapshot.load_states.append = LoadState::Error("timeout".into());
        assert_eq!(snapshot.event(), ApiEvent::Loading);
    }

    #[tokio::test]
    async fn test_initial_headlines_and_load_more() {
        let api = Arc::new(FakeNewsApi::with_pages(&[(1, 20), (2, 20)]));
        let feed = NewsFeed::spawn(repository(api.clone()));
        let mut rx = feed.subscribe();

        let first = wait_for(&mut rx, |s| s.articles.len() == 20).await;
        assert!(first.event().is_success());

        feed.send(FeedCommand::LoadMore).await;
        wait_for(&mut rx, |s| s.articles.len() == 40).await;

        feed.send(FeedCommand::LoadMore).await;
        let last = wait_for(&mut rx, |s| s.load_states.append.is_end_of_pagination()).await;
        assert_eq!(last.articles.len(), 40);

        let pages: Vec<u32> = api.calls().iter().map(|c| c.2).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_search_resets_cursor() {
        let api = Arc::new(FakeNewsApi::with_pages(&[(1, 5), (2, 5)]));
        let feed = NewsFeed::spawn(repository(api.clone()));
        let mut rx = feed.subscribe();

        wait_for(&mut rx, |s| s.articles.len() == 5).await;
        feed.send(FeedCommand::LoadMore).await;
        wait_for(&mut rx, |s| s.articles.len() == 10).await;

        feed.send(FeedCommand::Search("android".into())).await;
        let snapshot = wait_for(&mut rx, |s| s.generation == 1 && !s.articles.is_empty()).await;
        assert_eq!(snapshot.query, "android");
        assert_eq!(snapshot.articles.len(), 5);
        assert!(snapshot.articles[0].url.contains("/android/1/"));

        let last = api.calls().last().cloned().unwrap();
        assert_eq!(last, ("everything".into(), "android".into(), 1, 20));
    }

    #[tokio::test]
    async fn test_error_then_retry() {
        let api = Arc::new(FakeNewsApi {
            status: Some(StatusCode::TOO_MANY_REQUESTS),
            ..Default::default()
        });
        let feed = NewsFeed::spawn(repository(api.clone()));
        let mut rx = feed.subscribe();

        let failed = wait_for(&mut rx, |s| s.event().is_error()).await;
        assert!(failed.event().error_message().unwrap().contains("429"));

        feed.send(FeedCommand::Retry).await;
        tokio::time::timeout(Duration::from_secs(5), async {
            while api.calls().len() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(api.calls()[1].2, 1);
    }

    #[tokio::test]
    async fn test_empty_results() {
        let api = Arc::new(FakeNewsApi::default());
        let feed = NewsFeed::spawn(repository(api));
        let mut rx = feed.subscribe();

        let snapshot = wait_for(&mut rx, |s| s.event() == ApiEvent::Empty).await;
        assert!(snapshot.articles.is_empty());
    }

    /// Headlines block until released; searches answer immediately.
    struct SlowHeadlines {
        release: Notify,
    }

    #[async_trait]
    impl NewsApi for SlowHeadlines {
        async fn top_headlines(&self, _: &str, _: u32, _: u32) -> Result<ApiReply> {
            self.release.notified().await;
            Ok(ApiReply::new(
                StatusCode::OK,
                r#"{"status":"ok","totalResults":1,"articles":[{"url":"https://x/stale"}]}"#,
            ))
        }

        async fn search_everything(&self, query: &str, _: u32, _: u32) -> Result<ApiReply> {
            Ok(ApiReply::new(
                StatusCode::OK,
                format!(
                    r#"{{"status":"ok","totalResults":1,"articles":[{{"url":"https://x/{query}"}}]}}"#
                ),
            ))
        }
    }

    #[tokio::test]
    async fn test_new_query_supersedes_in_flight_load() {
        let api = Arc::new(SlowHeadlines {
            release: Notify::new(),
        });
        let feed = NewsFeed::spawn(repository(api.clone()));
        let mut rx = feed.subscribe();

        wait_for(&mut rx, |s| s.event() == ApiEvent::Loading).await;
        feed.send(FeedCommand::Search("fresh".into())).await;

        let snapshot = wait_for(&mut rx, |s| !s.articles.is_empty()).await;
        assert_eq!(snapshot.articles[0].url, "https://x/fresh");

        // Releasing the superseded request must not overwrite the list
        api.release.notify_waiters();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(feed.snapshot().articles[0].url, "https://x/fresh");
    }

    #[tokio::test]
    async fn test_refresh_restarts_current_query() {
        let api = Arc::new(FakeNewsApi::with_pages(&[(1, 5), (2, 5)]));
        let feed = NewsFeed::spawn_with_query(repository(api.clone()), "android".into());
        let mut rx = feed.subscribe();

        wait_for(&mut rx, |s| s.articles.len() == 5).await;
        feed.send(FeedCommand::LoadMore).await;
        wait_for(&mut rx, |s| s.articles.len() == 10).await;

        feed.send(FeedCommand::Refresh).await;
        let snapshot = wait_for(&mut rx, |s| {
            s.articles.len() == 5 && !s.load_states.refresh.is_loading()
        })
        .await;
        assert_eq!(snapshot.query, "android");
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.articles[4].url.contains("/android/1/"));

        let pages: Vec<u32> = api.calls().iter().map(|c| c.2).collect();
        assert_eq!(pages, vec![1, 2, 1]);
    }

    /// First pages answer immediately; later pages block until released.
    struct SlowAppend {
        release: Notify,
        pages: std::sync::Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl NewsApi for SlowAppend {
        async fn top_headlines(&self, _: &str, page: u32, _: u32) -> Result<ApiReply> {
            let call = {
                let mut pages = self.pages.lock().unwrap();
                pages.push(page);
                pages.len()
            };
            if page > 1 {
                self.release.notified().await;
            }
            Ok(ApiReply::new(
                StatusCode::OK,
                format!(
                    r#"{{"status":"ok","totalResults":9,"articles":[{{"url":"https://x/{page}/{call}"}}]}}"#
                ),
            ))
        }

        async fn search_everything(&self, _: &str, _: u32, _: u32) -> Result<ApiReply> {
            Ok(ApiReply::new(StatusCode::OK, r#"{"status":"ok","articles":[]}"#))
        }
    }

    #[tokio::test]
    async fn test_refresh_drops_in_flight_append() {
        let api = Arc::new(SlowAppend {
            release: Notify::new(),
            pages: std::sync::Mutex::new(Vec::new()),
        });
        let feed = NewsFeed::spawn(repository(api.clone()));
        let mut rx = feed.subscribe();

        wait_for(&mut rx, |s| s.articles.len() == 1).await;
        feed.send(FeedCommand::LoadMore).await;
        wait_for(&mut rx, |s| s.is_appending()).await;

        feed.send(FeedCommand::Refresh).await;
        let snapshot = wait_for(&mut rx, |s| {
            s.articles.first().map(|a| a.url.as_str()) == Some("https://x/1/3")
        })
        .await;
        assert!(!snapshot.is_appending());

        api.release.notify_waiters();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after = feed.snapshot();
        assert_eq!(after.articles.len(), 1);
        assert_eq!(after.articles[0].url, "https://x/1/3");
        assert_eq!(*api.pages.lock().unwrap(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_drop_stops_task() {
        let api = Arc::new(FakeNewsApi::with_pages(&[(1, 1)]));
        let feed = NewsFeed::spawn(repository(api));
        let mut rx = feed.subscribe();
        wait_for(&mut rx, |s| s.articles.len() == 1).await;

        drop(feed);
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
