use super::Article;

/// Outcome of a remote call as seen by everything above the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEvent {
    /// Well-formed response with at least one article
    Success(Vec<Article>),
    /// HTTP failure, transport fault or undecodable payload
    Error(String),
    /// Well-formed response without articles
    Empty,
    /// Request in flight
    Loading,
}

impl ApiEvent {
    pub fn articles(&self) -> &[Article] {
        match self {
            ApiEvent::Success(articles) => articles,
            _ => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiEvent::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ApiEvent::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ApiEvent::Error(message) => Some(message),
            _ => None,
        }
    }
}
