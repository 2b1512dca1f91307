use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};
use tokio::sync::watch;

use crate::app::{NewsdeckError, Result};
use crate::domain::{Article, Source};
use crate::store::Store;

const ARTICLE_COLUMNS: &str = "url, author, content, description, published_at, source_id, \
     source_name, title, url_to_image, is_saved";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    saved_tx: watch::Sender<Vec<Article>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        Self::run_migrations(&mut conn)?;
        let initial = Self::query_saved(&conn)?;
        let (saved_tx, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            saved_tx,
        })
    }

    fn run_migrations(conn: &mut Connection) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        migrations.to_latest(conn)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            NewsdeckError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn query_saved(conn: &Connection) -> Result<Vec<Article>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY saved_at, url"
        ))?;

        let articles = stmt
            .query_map([], Self::row_to_article)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn row_to_article(row: &Row<'_>) -> rusqlite::Result<Article> {
        let source_id: Option<String> = row.get(5)?;
        let source_name: Option<String> = row.get(6)?;
        let source = if source_id.is_none() && source_name.is_none() {
            None
        } else {
            Some(Source {
                id: source_id,
                name: source_name,
            })
        };

        Ok(Article {
            url: row.get(0)?,
            author: row.get(1)?,
            content: row.get(2)?,
            description: row.get(3)?,
            published_at: row.get(4)?,
            source,
            title: row.get(7)?,
            url_to_image: row.get(8)?,
            is_saved: row.get(9)?,
        })
    }

    /// Push the current table contents to every subscriber.
    fn publish(&self, conn: &Connection) -> Result<()> {
        let snapshot = Self::query_saved(conn)?;
        tracing::debug!("Publishing {} saved articles", snapshot.len());
        self.saved_tx.send_replace(snapshot);
        Ok(())
    }
}

impl Store for SqliteStore {
    fn insert(&self, article: &Article) -> Result<()> {
        if article.is_placeholder() {
            return Err(NewsdeckError::InvalidArticle(
                "article has no url".to_string(),
            ));
        }

        let conn = self.conn()?;
        let (source_id, source_name) = match &article.source {
            Some(source) => (source.id.as_deref(), source.name.as_deref()),
            None => (None, None),
        };

        conn.execute(
            "INSERT OR REPLACE INTO articles
             (url, author, content, description, published_at, source_id, source_name,
              title, url_to_image, is_saved, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                article.url,
                article.author,
                article.content,
                article.description,
                article.published_at,
                source_id,
                source_name,
                article.title,
                article.url_to_image,
                article.is_saved,
                Utc::now().to_rfc3339(),
            ],
        )?;

        self.publish(&conn)
    }

    fn delete(&self, article: &Article) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM articles WHERE url = ?1", params![article.url])?;
        if removed == 0 {
            tracing::debug!("Delete of unknown article ignored: {}", article.url);
            return Ok(());
        }

        self.publish(&conn)
    }

    fn get_saved(&self) -> Result<Vec<Article>> {
        let conn = self.conn()?;
        Self::query_saved(&conn)
    }

    fn get_article(&self, url: &str) -> Result<Option<Article>> {
        let conn = self.conn()?;
        let result = conn
            .query_row(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ?1"),
                params![url],
                Self::row_to_article,
            )
            .optional()?;

        Ok(result)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Article>> {
        self.saved_tx.subscribe()
    }
}
