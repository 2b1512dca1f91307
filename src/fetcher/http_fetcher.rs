use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use url::Url;

use crate::app::{NewsdeckError, Result};
use crate::config::ApiConfig;
use crate::fetcher::{clamp_page, clamp_page_size, ApiReply, NewsApi};

pub struct HttpNewsApi {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpNewsApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let value = HeaderValue::from_str(&config.api_key)
                .map_err(|e| NewsdeckError::Config(format!("Invalid API key: {}", e)))?;
            headers.insert("X-Api-Key", value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("newsdeck/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(&config.base_url)?,
            api_key: config.api_key.clone(),
        })
    }

    /// Endpoints are joined relative to the base, so it must end with a slash.
    fn normalize_base(base: &str) -> Result<Url> {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        Ok(Url::parse(&base)?)
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("apiKey", &self.api_key);
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<ApiReply> {
        tracing::debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        tracing::debug!("Response {} ({} bytes)", status, body.len());
        Ok(ApiReply { status, body })
    }
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn top_headlines(&self, country: &str, page: u32, page_size: u32) -> Result<ApiReply> {
        let url = self.endpoint(
            "top-headlines",
            &[
                ("country", country.to_string()),
                ("page", clamp_page(page).to_string()),
                ("pageSize", clamp_page_size(page_size).to_string()),
            ],
        )?;
        self.get(url).await
    }

    async fn search_everything(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ApiReply> {
        if query.trim().is_empty() {
            return Err(NewsdeckError::InvalidQuery(
                "search query must not be empty".to_string(),
            ));
        }

        let url = self.endpoint(
            "everything",
            &[
                ("q", query.to_string()),
                ("page", clamp_page(page).to_string()),
                ("pageSize", clamp_page_size(page_size).to_string()),
            ],
        )?;
        self.get(url).await
    }
}
