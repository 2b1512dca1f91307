pub mod http_fetcher;
pub mod safe_call;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::app::Result;

pub use http_fetcher::HttpNewsApi;
pub use safe_call::safe_api_call;

pub const DEFAULT_COUNTRY_CODE: &str = "us";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw HTTP outcome of a News API call
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiReply {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn reason(&self) -> &str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }
}

#[async_trait]
pub trait NewsApi {
    /// `GET top-headlines` for a country.
    async fn top_headlines(&self, country: &str, page: u32, page_size: u32) -> Result<ApiReply>;

    /// `GET everything` matching a free-text query.
    async fn search_everything(&self, query: &str, page: u32, page_size: u32)
        -> Result<ApiReply>;
}

pub fn clamp_page(page: u32) -> u32 {
    page.max(DEFAULT_PAGE)
}

pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}
