use serde::{Deserialize, Serialize};

use super::Article;

/// Decoded payload of a single `top-headlines` or `everything` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
}

/// Error object the API returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}
