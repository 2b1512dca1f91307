//! Page-by-page loading of articles.
//!
//! ```text
//! Pager ──LoadParams──▶ PagingSource ──safe_api_call──▶ NewsApi
//!   ▲                        │
//!   └──────LoadResult────────┘
//! ```
//!
//! - [`PagingSource`]: loads one page addressed by an integer key
//! - [`ArticlePagingSource`]: headlines or search against the News API
//! - [`Pager`]: accumulates pages and tracks refresh/append load states

pub mod pager;
pub mod source;

use async_trait::async_trait;

use crate::domain::Article;

pub use pager::{CombinedLoadStates, LoadKind, LoadRequest, LoadState, Pager};
pub use source::{ArticlePagingSource, ArticleQuery};

pub const STARTING_PAGE_INDEX: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParams {
    /// Page to load, `None` on the very first load
    pub key: Option<u32>,
    pub load_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub data: Vec<Article>,
    pub prev_key: Option<u32>,
    /// `None` once the end of the data is reached
    pub next_key: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    Page(Page),
    /// Recoverable; the same key may be retried
    Error(String),
}

#[async_trait]
pub trait PagingSource: Send + Sync {
    async fn load(&self, params: LoadParams) -> LoadResult;

    /// Key to restart from on refresh. No anchor tracking: always page one.
    fn refresh_key(&self) -> Option<u32> {
        None
    }
}
