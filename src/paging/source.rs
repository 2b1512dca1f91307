use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ApiEvent;
use crate::fetcher::{safe_api_call, NewsApi};
use crate::paging::{LoadParams, LoadResult, Page, PagingSource, STARTING_PAGE_INDEX};

const NO_DATA_MESSAGE: &str = "No Data Found.";

/// What an article list is browsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleQuery {
    Headlines { country: String },
    Search(String),
}

impl ArticleQuery {
    /// Blank text browses headlines, anything else searches.
    pub fn from_text(text: &str, country: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            ArticleQuery::Headlines {
                country: country.to_string(),
            }
        } else {
            ArticleQuery::Search(text.to_string())
        }
    }
}

pub struct ArticlePagingSource {
    api: Arc<dyn NewsApi + Send + Sync>,
    query: ArticleQuery,
}

impl ArticlePagingSource {
    pub fn new(api: Arc<dyn NewsApi + Send + Sync>, query: ArticleQuery) -> Self {
        Self { api, query }
    }

    pub fn query(&self) -> &ArticleQuery {
        &self.query
    }

    async fn call_api(&self, position: u32, load_size: u32) -> ApiEvent {
        match &self.query {
            ArticleQuery::Headlines { country } => {
                safe_api_call(self.api.top_headlines(country, position, load_size)).await
            }
            ArticleQuery::Search(query) => {
                safe_api_call(self.api.search_everything(query, position, load_size)).await
            }
        }
    }
}

#[async_trait]
impl PagingSource for ArticlePagingSource {
    async fn load(&self, params: LoadParams) -> LoadResult {
        let position = params.key.unwrap_or(STARTING_PAGE_INDEX);
        let prev_key = if position == STARTING_PAGE_INDEX {
            None
        } else {
            Some(position - 1)
        };

        tracing::debug!("Loading page {} of {:?}", position, self.query);

        match self.call_api(position, params.load_size).await {
            ApiEvent::Success(data) => LoadResult::Page(Page {
                data,
                prev_key,
                next_key: Some(position + 1),
            }),
            ApiEvent::Empty => LoadResult::Page(Page {
                data: Vec::new(),
                prev_key,
                next_key: None,
            }),
            ApiEvent::Error(message) => LoadResult::Error(message),
            ApiEvent::Loading => LoadResult::Error(NO_DATA_MESSAGE.to_string()),
        }
    }
}
