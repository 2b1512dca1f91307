use std::sync::Arc;

use tokio::sync::watch;

use crate::app::Result;
use crate::config::ApiConfig;
use crate::domain::{ApiEvent, Article};
use crate::fetcher::{clamp_page_size, safe_api_call, NewsApi};
use crate::paging::{ArticlePagingSource, ArticleQuery, Pager};
use crate::store::Store;

/// Mediates between the screens and the News API / local store.
///
/// There is no cache besides the store: every headline or search request
/// goes to the network.
#[derive(Clone)]
pub struct Repository {
    api: Arc<dyn NewsApi + Send + Sync>,
    store: Arc<dyn Store + Send + Sync>,
    country: String,
    page_size: u32,
}

impl Repository {
    pub fn new(
        api: Arc<dyn NewsApi + Send + Sync>,
        store: Arc<dyn Store + Send + Sync>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            api,
            store,
            country: config.country.clone(),
            page_size: clamp_page_size(config.page_size),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn fetch_headlines(&self, page: u32) -> ApiEvent {
        safe_api_call(self.api.top_headlines(&self.country, page, self.page_size)).await
    }

    pub async fn fetch_headlines_for(&self, country: &str, page: u32) -> ApiEvent {
        safe_api_call(self.api.top_headlines(country, page, self.page_size)).await
    }

    pub async fn search(&self, query: &str, page: u32) -> ApiEvent {
        safe_api_call(self.api.search_everything(query, page, self.page_size)).await
    }

    /// Pager for headlines when `query` is blank, for search results otherwise.
    pub fn articles_pager(&self, query: &str) -> Pager {
        let query = ArticleQuery::from_text(query, &self.country);
        let source = ArticlePagingSource::new(self.api.clone(), query);
        Pager::new(Arc::new(source), self.page_size)
    }

    pub fn saved_articles(&self) -> watch::Receiver<Vec<Article>> {
        self.store.subscribe()
    }

    pub fn saved_snapshot(&self) -> Result<Vec<Article>> {
        self.store.get_saved()
    }

    pub fn find_saved(&self, url: &str) -> Result<Option<Article>> {
        self.store.get_article(url)
    }

    pub fn save(&self, article: &Article) -> Result<()> {
        self.store.insert(&article.saved())?;
        tracing::info!("Saved article {}", article.url);
        Ok(())
    }

    pub fn remove(&self, article: &Article) -> Result<()> {
        self.store.delete(article)?;
        tracing::info!("Removed article {}", article.url);
        Ok(())
    }
}
