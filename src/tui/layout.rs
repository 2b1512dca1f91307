use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::{ApiEvent, Article};
use crate::tui::app::{Screen, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Min(5),    // List or detail
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_search_bar(frame, app, chunks[0], colors);

    if app.show_detail {
        render_detail(frame, app, chunks[1], colors);
    } else {
        match app.screen {
            Screen::News => render_news_list(frame, app, chunks[1], colors),
            Screen::Saved => render_saved_list(frame, app, chunks[1], colors),
        }
    }

    render_status_bar(frame, app, chunks[2], colors);
}

fn render_search_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let border_style = if app.editing_search {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let text = if app.search_input.is_empty() && !app.editing_search {
        Span::styled(
            "Top headlines (press / to search)",
            Style::default().fg(colors.inactive_border),
        )
    } else {
        Span::styled(app.search_input.as_str(), Style::default().fg(colors.search_fg))
    };

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
}

fn article_row<'a>(article: &'a Article, saved: bool, colors: &ColorConfig) -> ListItem<'a> {
    let marker = if saved { "★" } else { " " };
    let date = article
        .published_at()
        .map(|d| d.format("%m/%d").to_string())
        .unwrap_or_else(|| "     ".to_string());

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(colors.saved_marker)),
        Span::raw(" "),
        Span::styled(date, Style::default().fg(colors.metadata_date)),
        Span::raw(" "),
        Span::styled(article.display_title(), Style::default().fg(colors.article)),
    ];
    if let Some(source) = article.display_source() {
        spans.push(Span::styled(
            format!("  {}", source),
            Style::default().fg(colors.metadata_source),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn list_block(title: String, colors: &ColorConfig) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.active_border))
}

fn highlight(colors: &ColorConfig) -> Style {
    Style::default()
        .bg(colors.selection_bg)
        .fg(colors.selection_fg)
        .add_modifier(Modifier::BOLD)
}

fn render_news_list(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let title = format!(
        " News ({}) [{}/{}] ",
        app.feed.articles.len(),
        app.news_index + 1,
        app.feed.articles.len().max(1)
    );

    let message = match app.feed.event() {
        ApiEvent::Loading if app.feed.articles.is_empty() => Some("Loading...".to_string()),
        ApiEvent::Error(message) if app.feed.articles.is_empty() => Some(message),
        ApiEvent::Empty => Some("No data found".to_string()),
        _ => None,
    };

    if let Some(message) = message {
        let paragraph = Paragraph::new(message)
            .block(list_block(title, colors))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .feed
        .articles
        .iter()
        .map(|article| article_row(article, app.is_saved(&article.url), colors))
        .collect();

    let list = List::new(items)
        .block(list_block(title, colors))
        .highlight_style(highlight(colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.news_list_state);
}

fn render_saved_list(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let title = format!(
        " Saved ({}) [{}/{}] ",
        app.saved.len(),
        app.saved_index + 1,
        app.saved.len().max(1)
    );

    if app.saved.is_empty() {
        let paragraph = Paragraph::new("No saved articles").block(list_block(title, colors));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .saved
        .iter()
        .map(|article| article_row(article, true, colors))
        .collect();

    let list = List::new(items)
        .block(list_block(title, colors))
        .highlight_style(highlight(colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.saved_list_state);
}

fn render_detail(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let Some(article) = app.selected_article() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            article.display_title(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(source) = article.display_source() {
        lines.push(Line::from(Span::styled(
            format!("Source: {}", source),
            Style::default().fg(colors.metadata_source),
        )));
    }
    if let Some(author) = &article.author {
        lines.push(Line::from(Span::styled(
            format!("By: {}", author),
            Style::default().fg(colors.metadata_source),
        )));
    }
    if let Some(date) = article.published_at() {
        lines.push(Line::from(Span::styled(
            format!("Date: {}", date.format("%Y-%m-%d %H:%M")),
            Style::default().fg(colors.metadata_date),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("Link: {}", article.url),
        Style::default().fg(colors.metadata_link),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(
        "─".repeat(area.width.saturating_sub(2) as usize),
    ));
    lines.push(Line::from(""));

    if let Some(description) = &article.description {
        for line in plain_text(description).lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::from(""));
    }
    for line in plain_text(article.display_content()).lines() {
        lines.push(Line::from(line.to_string()));
    }

    let saved = if app.is_saved(&article.url) { " ★" } else { "" };
    let block = Block::default()
        .title(format!(" Article{} ", saved))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.active_border));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let base = Style::default().fg(colors.status_fg).bg(colors.status_bg);
    let error = base.fg(colors.error_fg);

    let (status, style) = if app.editing_search {
        ("Type to search  Enter:Submit  Esc:Done".to_string(), base)
    } else if let Some(ref msg) = app.status_message {
        (msg.clone(), base)
    } else if app.screen == Screen::News {
        news_status(app, base, error)
    } else if app.last_deleted.is_some() {
        ("Article removed  u:Undo".to_string(), base)
    } else {
        (
            "j/k:Nav  Enter:Read  d:Delete  o:Open  Tab:News  q:Quit".to_string(),
            base,
        )
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

fn news_status(app: &TuiApp, base: Style, error: Style) -> (String, Style) {
    match app.feed.event() {
        ApiEvent::Loading => ("Loading...".to_string(), base),
        ApiEvent::Error(message) => (format!("{}  r:Retry", message), error),
        ApiEvent::Empty => ("No data found".to_string(), base),
        ApiEvent::Success(_) => {
            if let Some(message) = app.feed.append_error() {
                (format!("{}  r:Retry", message), error)
            } else if app.feed.is_appending() {
                ("Loading more...".to_string(), base)
            } else {
                (
                    "j/k:Nav  Enter:Read  /:Search  s:Save  o:Open  R:Refresh  Tab:Saved  q:Quit"
                        .to_string(),
                    base,
                )
            }
        }
    }
}

/// Decode entities and drop markup from API text fields.
fn plain_text(html: &str) -> String {
    let decoded = html_escape::decode_html_entities(html);
    let mut result = String::new();
    let mut in_tag = false;
    let mut last_was_space = false;

    for c in decoded.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => {
                if c.is_whitespace() {
                    if !last_was_space {
                        result.push(' ');
                        last_was_space = true;
                    }
                } else {
                    result.push(c);
                    last_was_space = false;
                }
            }
            _ => {}
        }
    }

    result.trim().to_string()
}
