//! The single boundary that turns raw News API outcomes into [`ApiEvent`]s.
//!
//! Nothing above this module sees transport faults: every call site in the
//! repository and the paging source goes through [`safe_api_call`].

use std::future::Future;

use tracing::{debug, warn};

use crate::app::Result;
use crate::domain::{ApiErrorBody, ApiEvent, NewsApiResponse};
use crate::fetcher::ApiReply;

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred...";

pub async fn safe_api_call<F>(call: F) -> ApiEvent
where
    F: Future<Output = Result<ApiReply>>,
{
    match call.await {
        Ok(reply) => classify_reply(&reply),
        Err(e) => {
            let message = e.to_string();
            warn!("News API call failed: {}", message);
            if message.trim().is_empty() {
                ApiEvent::Error(UNKNOWN_ERROR_MESSAGE.to_string())
            } else {
                ApiEvent::Error(message)
            }
        }
    }
}

pub fn classify_reply(reply: &ApiReply) -> ApiEvent {
    if !reply.status.is_success() {
        let message = format_http_error(reply);
        warn!("News API returned {}", message);
        return ApiEvent::Error(message);
    }

    match serde_json::from_slice::<NewsApiResponse>(&reply.body) {
        Ok(response) if !response.articles.is_empty() => {
            debug!(
                "Received {} articles ({} total)",
                response.articles.len(),
                response.total_results
            );
            ApiEvent::Success(response.articles)
        }
        Ok(_) => {
            debug!("Received an empty page");
            ApiEvent::Empty
        }
        Err(e) => {
            warn!("Malformed News API payload: {}", e);
            ApiEvent::Error(e.to_string())
        }
    }
}

fn format_http_error(reply: &ApiReply) -> String {
    let mut message = format!("Code: {} - Error: {}", reply.status.as_u16(), reply.reason());

    let body = error_body_text(&reply.body);
    if !body.is_empty() {
        message.push_str(" - ");
        message.push_str(&body);
    }

    message
}

/// Prefer the API's `message` field, fall back to the raw body.
fn error_body_text(body: &[u8]) -> String {
    if let Ok(error) = serde_json::from_slice::<ApiErrorBody>(body) {
        return error.message;
    }
    String::from_utf8_lossy(body).trim().to_string()
}
