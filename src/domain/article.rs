use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publisher of an article as reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub author: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<Source>,
    pub title: Option<String>,
    /// Canonical URL. Unique key in the local store.
    #[serde(default)]
    pub url: String,
    pub url_to_image: Option<String>,
    #[serde(default, skip_serializing)]
    pub is_saved: bool,
}

impl Article {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Placeholder articles carry no URL and can never be persisted.
    pub fn is_placeholder(&self) -> bool {
        self.url.trim().is_empty()
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("(Untitled)")
    }

    pub fn display_source(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.name.as_deref().or(s.id.as_deref()))
    }

    /// Best available body text for the detail pane
    pub fn display_content(&self) -> &str {
        self.content
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| raw.parse::<DateTime<Utc>>().ok())
    }

    /// Copy of this article flagged as bookmarked.
    pub fn saved(&self) -> Self {
        Self {
            is_saved: true,
            ..self.clone()
        }
    }
}
