use std::io::Write;

use crate::app::{AppContext, NewsdeckError, Result};
use crate::domain::{ApiEvent, Article};

pub async fn headlines(ctx: &AppContext, country: Option<&str>, page: u32) -> Result<()> {
    let event = match country {
        Some(country) => ctx.repository.fetch_headlines_for(country, page).await,
        None => ctx.repository.fetch_headlines(page).await,
    };
    report(&event, page)
}

pub async fn search(ctx: &AppContext, query: &str, page: u32) -> Result<()> {
    let event = ctx.repository.search(query, page).await;
    report(&event, page)
}

pub fn list_saved(ctx: &AppContext) -> Result<()> {
    let saved = ctx.repository.saved_snapshot()?;

    if saved.is_empty() {
        println!("No saved articles");
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for article in &saved {
        write_article(&mut out, article)?;
    }
    Ok(())
}

pub fn remove(ctx: &AppContext, url: &str) -> Result<()> {
    let article = ctx
        .repository
        .find_saved(url)?
        .ok_or_else(|| NewsdeckError::ArticleNotFound(url.to_string()))?;

    ctx.repository.remove(&article)?;
    println!("Removed: {}", article.display_title());
    Ok(())
}

fn report(event: &ApiEvent, page: u32) -> Result<()> {
    match event {
        ApiEvent::Success(articles) => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "Page {} ({} articles)", page, articles.len())?;
            for article in articles {
                write_article(&mut out, article)?;
            }
            Ok(())
        }
        ApiEvent::Empty | ApiEvent::Loading => {
            println!("No data found.");
            Ok(())
        }
        ApiEvent::Error(message) => Err(NewsdeckError::Other(message.clone())),
    }
}

fn write_article<W: Write>(out: &mut W, article: &Article) -> Result<()> {
    let date = article
        .published_at()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "          ".to_string());
    let marker = if article.is_saved { "★" } else { " " };

    writeln!(out, "{} {} {}", marker, date, article.display_title())?;
    if let Some(source) = article.display_source() {
        writeln!(out, "    {}", source)?;
    }
    writeln!(out, "    {}", article.url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_write_article_lines() {
        let mut article = Article::new("https://x/1").saved();
        article.title = Some("Headline".into());
        article.published_at = Some("2021-03-05T10:00:00Z".into());

        let mut buf = Vec::new();
        write_article(&mut buf, &article).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "★ 2021-03-05 Headline\n    https://x/1\n");
    }

    #[test]
    fn test_report_error_fails_command() {
        let result = report(&ApiEvent::Error("Code: 401".into()), 1);
        assert!(matches!(result, Err(NewsdeckError::Other(m)) if m == "Code: 401"));
        assert!(report(&ApiEvent::Empty, 2).is_ok());
    }

    #[test]
    fn test_remove_unknown_article() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        let result = remove(&ctx, "https://x/none");
        assert!(matches!(result, Err(NewsdeckError::ArticleNotFound(_))));
    }

    #[test]
    fn test_remove_saved_article() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        ctx.repository.save(&Article::new("https://x/1")).unwrap();

        remove(&ctx, "https://x/1").unwrap();
        assert!(ctx.repository.saved_snapshot().unwrap().is_empty());
    }
}
