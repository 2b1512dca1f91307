pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{AppContext, Result};
use crate::domain::ApiEvent;
use crate::feed::{FeedCommand, NewsFeed};
use crate::repository::Repository;

use self::app::{Screen, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>) -> Result<()> {
    let config = &ctx.config;
    let mut tui_app = TuiApp::new(Duration::from_millis(config.api.search_delay_ms));
    let event_handler = EventHandler::new(Duration::from_millis(100));

    // The feed task lives as long as this screen
    let feed = NewsFeed::spawn(ctx.repository.clone());
    let mut feed_rx = feed.subscribe();
    let mut saved_rx = ctx.repository.saved_articles();
    tui_app.set_saved(saved_rx.borrow_and_update().clone());

    loop {
        if feed_rx.has_changed().unwrap_or(false) {
            tui_app.set_feed(feed_rx.borrow_and_update().clone());
        }
        if saved_rx.has_changed().unwrap_or(false) {
            tui_app.set_saved(saved_rx.borrow_and_update().clone());
        }

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) if tui_app.editing_search => {
                if let Some(query) = handle_search_key(&mut tui_app, key) {
                    feed.send(FeedCommand::Search(query)).await;
                }
            }
            AppEvent::Key(key) => {
                tui_app.clear_status();
                let action = config.keybindings.get_action(&key);
                match action {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::MoveUp => {
                        tui_app.move_up();
                    }
                    Action::MoveDown => {
                        tui_app.move_down();
                        if tui_app.at_last_row() && !tui_app.show_detail {
                            feed.send(FeedCommand::LoadMore).await;
                        }
                    }
                    Action::NextPage => {
                        tui_app.next_page();
                        if tui_app.at_last_row() && !tui_app.show_detail {
                            feed.send(FeedCommand::LoadMore).await;
                        }
                    }
                    Action::PrevPage => {
                        tui_app.prev_page();
                    }
                    Action::SwitchScreen => {
                        tui_app.switch_screen();
                    }
                    Action::Select => {
                        tui_app.toggle_detail();
                    }
                    Action::Search => {
                        tui_app.begin_search();
                    }
                    Action::Save => {
                        if let Err(e) = save_selected(&mut tui_app, &ctx.repository) {
                            tracing::error!("Store operation failed: {}", e);
                            tui_app.set_status(format!("Error: {}", e));
                        }
                    }
                    Action::Delete => {
                        if let Err(e) = delete_selected(&mut tui_app, &ctx.repository) {
                            tracing::error!("Store operation failed: {}", e);
                            tui_app.set_status(format!("Error: {}", e));
                        }
                    }
                    Action::Undo => {
                        if let Err(e) = undo_delete(&mut tui_app, &ctx.repository) {
                            tracing::error!("Store operation failed: {}", e);
                            tui_app.set_status(format!("Error: {}", e));
                        }
                    }
                    Action::OpenInBrowser => {
                        if let Some(article) = tui_app.selected_article() {
                            let url = article.url.clone();
                            if let Err(e) = open::that(&url) {
                                tui_app.set_status(format!("Failed to open browser: {}", e));
                            }
                        }
                    }
                    Action::Retry => {
                        // Nothing failed on an empty result, so start over
                        let command = if tui_app.feed.event() == ApiEvent::Empty {
                            FeedCommand::Refresh
                        } else {
                            FeedCommand::Retry
                        };
                        feed.send(command).await;
                    }
                    Action::Refresh => {
                        feed.send(FeedCommand::Refresh).await;
                    }
                    Action::None => {}
                }
            }
            AppEvent::Tick => {
                if let Some(query) = tui_app.debouncer.take_ready(Instant::now()) {
                    feed.send(FeedCommand::Search(query)).await;
                }
            }
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Edit the search text. Returns a query to submit immediately on Enter.
fn handle_search_key(app: &mut TuiApp, key: KeyEvent) -> Option<String> {
    match key.code {
        KeyCode::Enter => Some(app.submit_search()),
        KeyCode::Esc => {
            app.editing_search = false;
            None
        }
        KeyCode::Backspace => {
            app.pop_search_char(Instant::now());
            None
        }
        KeyCode::Char(c) => {
            app.push_search_char(c, Instant::now());
            None
        }
        _ => None,
    }
}

fn save_selected(app: &mut TuiApp, repository: &Repository) -> Result<()> {
    let Some(article) = app.selected_article().cloned() else {
        return Ok(());
    };
    if app.is_saved(&article.url) {
        app.set_status("Already saved".to_string());
        return Ok(());
    }

    repository.save(&article)?;
    app.set_status(format!("Saved: {}", article.display_title()));
    Ok(())
}

fn delete_selected(app: &mut TuiApp, repository: &Repository) -> Result<()> {
    let Some(article) = app.selected_article().cloned() else {
        return Ok(());
    };
    if !app.is_saved(&article.url) {
        return Ok(());
    }

    repository.remove(&article)?;
    app.set_status("Article removed  u:Undo".to_string());
    app.last_deleted = Some(article);
    if app.screen == Screen::Saved {
        app.show_detail = false;
    }
    Ok(())
}

fn undo_delete(app: &mut TuiApp, repository: &Repository) -> Result<()> {
    if let Some(article) = app.last_deleted.take() {
        repository.save(&article)?;
        app.set_status(format!("Restored: {}", article.display_title()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::Article;
    use crate::feed::FeedSnapshot;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_news(urls: &[&str]) -> TuiApp {
        let mut app = TuiApp::new(Duration::from_millis(500));
        app.set_feed(FeedSnapshot {
            articles: urls.iter().map(|u| Article::new(*u)).collect(),
            ..Default::default()
        });
        app
    }

    fn sync_saved(app: &mut TuiApp, repository: &Repository) {
        app.set_saved(repository.saved_snapshot().unwrap());
    }

    #[test]
    fn test_search_keys() {
        let mut app = TuiApp::new(Duration::from_millis(500));
        app.begin_search();

        assert_eq!(handle_search_key(&mut app, key(KeyCode::Char('g'))), None);
        assert_eq!(handle_search_key(&mut app, key(KeyCode::Char('o'))), None);
        assert!(app.debouncer.is_pending());
        assert_eq!(
            handle_search_key(&mut app, key(KeyCode::Enter)),
            Some("go".to_string())
        );
        assert!(!app.editing_search);
        assert!(!app.debouncer.is_pending());
    }

    #[test]
    fn test_save_delete_undo() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        let repository = &ctx.repository;
        let mut app = app_with_news(&["https://x/1", "https://x/2"]);

        save_selected(&mut app, repository).unwrap();
        sync_saved(&mut app, repository);
        assert!(app.is_saved("https://x/1"));

        delete_selected(&mut app, repository).unwrap();
        sync_saved(&mut app, repository);
        assert!(!app.is_saved("https://x/1"));
        assert!(app.last_deleted.is_some());

        undo_delete(&mut app, repository).unwrap();
        sync_saved(&mut app, repository);
        assert!(app.is_saved("https://x/1"));
        assert!(app.last_deleted.is_none());
    }

    #[test]
    fn test_delete_unsaved_is_noop() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        let mut app = app_with_news(&["https://x/1"]);

        delete_selected(&mut app, &ctx.repository).unwrap();
        assert!(app.last_deleted.is_none());
        assert_eq!(app.status_message, None);
    }

    #[test]
    fn test_save_twice_reports_already_saved() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        let mut app = app_with_news(&["https://x/1"]);

        save_selected(&mut app, &ctx.repository).unwrap();
        sync_saved(&mut app, &ctx.repository);
        save_selected(&mut app, &ctx.repository).unwrap();
        assert_eq!(app.status_message.as_deref(), Some("Already saved"));
        assert_eq!(ctx.repository.saved_snapshot().unwrap().len(), 1);
    }
}
