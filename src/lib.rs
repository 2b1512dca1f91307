//! # Newsdeck
//!
//! A terminal news reader for the News API: browse top headlines, search
//! all articles, and keep a local list of saved articles.
//!
//! ## Architecture
//!
//! ```text
//! NewsApi → safe_api_call → PagingSource → Pager → NewsFeed → TUI
//!                                   Store ──watch──────────────▲
//! ```
//!
//! - [`fetcher`]: HTTP client for the two News API endpoints
//! - [`paging`]: page-keyed loading with combined load states
//! - [`feed`]: background task holding the list screen's state
//! - [`store`]: SQLite persistence for saved articles
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! export NEWS_API_KEY=...
//!
//! # Top headlines for the configured country
//! newsdeck headlines
//!
//! # Search everything
//! newsdeck search android --page 2
//!
//! # Launch TUI
//! newsdeck
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// the API client and the repository.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/newsdeck/config.toml`, supporting:
/// - API settings (key, country, page size, search delay)
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Command-line interface using clap.
///
/// - `headlines [--page] [--country]` - Top headlines
/// - `search <query> [--page]` - Search all articles
/// - `saved` - List saved articles
/// - `remove <url>` - Remove a saved article
/// - `tui` - Launch the TUI (default)
pub mod cli;

/// Core domain models.
///
/// - [`Article`](domain::Article): A news article, keyed by URL
/// - [`ApiEvent`](domain::ApiEvent): Outcome of one remote call
/// - [`NewsApiResponse`](domain::NewsApiResponse): Wire format
pub mod domain;

/// Background state holder for the article list.
pub mod feed;

/// News API access.
///
/// - [`NewsApi`](fetcher::NewsApi): Async trait over the two endpoints
/// - [`HttpNewsApi`](fetcher::HttpNewsApi): reqwest-based implementation
/// - [`safe_api_call`](fetcher::safe_api_call): Turns any reply or failure into an [`ApiEvent`](domain::ApiEvent)
pub mod fetcher;

/// Page-keyed incremental loading.
pub mod paging;

/// Single entry point over the remote API and the local store.
pub mod repository;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Terminal user interface.
///
/// News screen (search bar, paged list, detail view) and Saved screen.
/// Keybindings: j/k navigate, / searches, s saves, d deletes, u undoes,
/// o opens in browser, r retries, Tab switches screens, q quits.
pub mod tui;
