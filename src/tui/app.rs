use std::collections::HashSet;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::domain::Article;
use crate::feed::FeedSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    News,
    Saved,
}

impl Screen {
    pub fn toggle(self) -> Self {
        match self {
            Screen::News => Screen::Saved,
            Screen::Saved => Screen::News,
        }
    }
}

pub const PAGE_SIZE: usize = 10;

/// Holds back search text until typing pauses for `delay`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a new value, restarting the delay.
    pub fn input(&mut self, text: &str, now: Instant) {
        self.pending = Some((text.to_string(), now));
    }

    /// The pending value once the delay has passed since the last input.
    pub fn take_ready(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if now.duration_since(*at) >= self.delay => {
                self.pending.take().map(|(text, _)| text)
            }
            _ => None,
        }
    }

    /// The pending value regardless of the delay.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(text, _)| text)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

pub struct TuiApp {
    pub screen: Screen,
    pub feed: FeedSnapshot,
    pub saved: Vec<Article>,
    saved_urls: HashSet<String>,
    pub news_index: usize,
    pub saved_index: usize,
    pub news_list_state: ListState,
    pub saved_list_state: ListState,
    // Search input
    pub search_input: String,
    pub editing_search: bool,
    pub debouncer: Debouncer,
    // Detail pane
    pub show_detail: bool,
    pub detail_scroll: u16,
    pub last_deleted: Option<Article>,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl TuiApp {
    pub fn new(search_delay: Duration) -> Self {
        let mut news_list_state = ListState::default();
        news_list_state.select(Some(0));
        let mut saved_list_state = ListState::default();
        saved_list_state.select(Some(0));

        Self {
            screen: Screen::News,
            feed: FeedSnapshot::default(),
            saved: Vec::new(),
            saved_urls: HashSet::new(),
            news_index: 0,
            saved_index: 0,
            news_list_state,
            saved_list_state,
            search_input: String::new(),
            editing_search: false,
            debouncer: Debouncer::new(search_delay),
            show_detail: false,
            detail_scroll: 0,
            last_deleted: None,
            should_quit: false,
            status_message: None,
        }
    }

    /// Take a new list snapshot. A new query generation resets the selection.
    pub fn set_feed(&mut self, snapshot: FeedSnapshot) {
        if snapshot.generation != self.feed.generation {
            self.news_index = 0;
            self.detail_scroll = 0;
        }
        self.feed = snapshot;
        self.news_index = clamp_index(self.news_index, self.feed.articles.len());
        self.news_list_state.select(Some(self.news_index));
    }

    pub fn set_saved(&mut self, saved: Vec<Article>) {
        self.saved_urls = saved.iter().map(|a| a.url.clone()).collect();
        self.saved = saved;
        self.saved_index = clamp_index(self.saved_index, self.saved.len());
        self.saved_list_state.select(Some(self.saved_index));
    }

    pub fn is_saved(&self, url: &str) -> bool {
        self.saved_urls.contains(url)
    }

    pub fn selected_article(&self) -> Option<&Article> {
        match self.screen {
            Screen::News => self.feed.articles.get(self.news_index),
            Screen::Saved => self.saved.get(self.saved_index),
        }
    }

    /// The selection sits on the last loaded row of the news list.
    pub fn at_last_row(&self) -> bool {
        self.screen == Screen::News
            && !self.feed.articles.is_empty()
            && self.news_index + 1 >= self.feed.articles.len()
    }

    pub fn switch_screen(&mut self) {
        self.screen = self.screen.toggle();
        self.show_detail = false;
        self.detail_scroll = 0;
    }

    pub fn toggle_detail(&mut self) {
        if self.selected_article().is_some() {
            self.show_detail = !self.show_detail;
            self.detail_scroll = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.show_detail {
            self.detail_scroll = self.detail_scroll.saturating_sub(1);
            return;
        }
        let index = self.current_index().saturating_sub(1);
        self.select(index);
    }

    pub fn move_down(&mut self) {
        if self.show_detail {
            self.detail_scroll = self.detail_scroll.saturating_add(1);
            return;
        }
        let index = clamp_index(self.current_index() + 1, self.current_len());
        self.select(index);
    }

    pub fn next_page(&mut self) {
        if self.show_detail {
            self.detail_scroll = self.detail_scroll.saturating_add(PAGE_SIZE as u16);
            return;
        }
        let index = clamp_index(self.current_index() + PAGE_SIZE, self.current_len());
        self.select(index);
    }

    pub fn prev_page(&mut self) {
        if self.show_detail {
            self.detail_scroll = self.detail_scroll.saturating_sub(PAGE_SIZE as u16);
            return;
        }
        let index = self.current_index().saturating_sub(PAGE_SIZE);
        self.select(index);
    }

    pub fn begin_search(&mut self) {
        self.screen = Screen::News;
        self.show_detail = false;
        self.editing_search = true;
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.debouncer.input(&self.search_input, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        if self.search_input.pop().is_some() {
            self.debouncer.input(&self.search_input, now);
        }
    }

    /// Leave input mode and return the query to submit right away.
    pub fn submit_search(&mut self) -> String {
        self.editing_search = false;
        self.debouncer.flush();
        self.search_input.clone()
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    fn current_index(&self) -> usize {
        match self.screen {
            Screen::News => self.news_index,
            Screen::Saved => self.saved_index,
        }
    }

    fn current_len(&self) -> usize {
        match self.screen {
            Screen::News => self.feed.articles.len(),
            Screen::Saved => self.saved.len(),
        }
    }

    fn select(&mut self, index: usize) {
        match self.screen {
            Screen::News => {
                self.news_index = index;
                self.news_list_state.select(Some(index));
            }
            Screen::Saved => {
                self.saved_index = index;
                self.saved_list_state.select(Some(index));
            }
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<Article> {
        (0..n).map(|i| Article::new(format!("https://x/{}", i))).collect()
    }

    fn snapshot(generation: u64, n: usize) -> FeedSnapshot {
        FeedSnapshot {
            generation,
            articles: articles(n),
            ..Default::default()
        }
    }

    #[test]
    fn test_debouncer_waits_for_pause() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.input("and", start);
        debouncer.input("andr", start + Duration::from_millis(300));
        assert_eq!(debouncer.take_ready(start + Duration::from_millis(600)), None);
        assert_eq!(
            debouncer.take_ready(start + Duration::from_millis(800)),
            Some("andr".to_string())
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_submit_search_flushes_debounce() {
        let now = Instant::now();
        let mut app = TuiApp::new(Duration::from_millis(500));
        app.begin_search();
        for c in "rust".chars() {
            app.push_search_char(c, now);
        }
        app.pop_search_char(now);

        assert_eq!(app.submit_search(), "rus");
        assert!(!app.editing_search);
        assert!(!app.debouncer.is_pending());
    }

    #[test]
    fn test_navigation_clamps() {
        let mut app = TuiApp::new(Duration::ZERO);
        app.set_feed(snapshot(0, 15));

        app.move_up();
        assert_eq!(app.news_index, 0);
        app.next_page();
        assert_eq!(app.news_index, 10);
        app.next_page();
        assert_eq!(app.news_index, 14);
        assert!(app.at_last_row());
        app.move_down();
        assert_eq!(app.news_index, 14);
        app.prev_page();
        assert_eq!(app.news_index, 4);
    }

    #[test]
    fn test_new_generation_resets_selection() {
        let mut app = TuiApp::new(Duration::ZERO);
        app.set_feed(snapshot(1, 20));
        app.next_page();

        // More pages of the same query keep the position
        app.set_feed(snapshot(1, 40));
        assert_eq!(app.news_index, 10);

        app.set_feed(snapshot(2, 5));
        assert_eq!(app.news_index, 0);
    }

    #[test]
    fn test_saved_list_tracks_urls() {
        let mut app = TuiApp::new(Duration::ZERO);
        app.set_saved(articles(3));
        app.switch_screen();
        app.move_down();
        app.move_down();
        assert_eq!(app.saved_index, 2);

        app.set_saved(articles(1));
        assert_eq!(app.saved_index, 0);
        assert!(app.is_saved("https://x/0"));
        assert!(!app.is_saved("https://x/2"));
        assert!(!app.at_last_row());
    }

    #[test]
    fn test_detail_scrolls_instead_of_moving() {
        let mut app = TuiApp::new(Duration::ZERO);
        app.set_feed(snapshot(0, 5));
        app.toggle_detail();
        assert!(app.show_detail);

        app.move_down();
        app.move_down();
        assert_eq!(app.detail_scroll, 2);
        assert_eq!(app.news_index, 0);
    }
}
