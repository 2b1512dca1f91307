use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{NewsdeckError, Result};
use crate::config::Config;
use crate::fetcher::{HttpNewsApi, NewsApi};
use crate::repository::Repository;
use crate::store::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub api: Arc<dyn NewsApi + Send + Sync>,
    pub repository: Repository,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!("Opened article store at {}", db_path.display());
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        if config.api.api_key.is_empty() {
            tracing::warn!("No News API key configured; requests will be rejected");
        }

        let api: Arc<dyn NewsApi + Send + Sync> = Arc::new(HttpNewsApi::new(&config.api)?);
        let repository = Repository::new(api.clone(), store.clone(), &config.api);

        Ok(Self {
            config,
            store,
            api,
            repository,
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsdeckError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("newsdeck");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("newsdeck.db"))
    }
}
