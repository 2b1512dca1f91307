pub mod sqlite;

use tokio::sync::watch;

use crate::app::Result;
use crate::domain::Article;

pub use sqlite::SqliteStore;

/// Bookmarked articles keyed by URL.
pub trait Store {
    /// Insert or replace the row with the same URL.
    fn insert(&self, article: &Article) -> Result<()>;
    /// Remove the row with the article's URL. Missing rows are ignored.
    fn delete(&self, article: &Article) -> Result<()>;
    fn get_saved(&self) -> Result<Vec<Article>>;
    fn get_article(&self, url: &str) -> Result<Option<Article>>;
    fn count(&self) -> Result<usize>;

    /// Live view of all saved rows, republished after every change.
    fn subscribe(&self) -> watch::Receiver<Vec<Article>>;
}
