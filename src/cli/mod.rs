pub mod commands;

use clap::{Parser, Subcommand};

use crate::fetcher::DEFAULT_PAGE;

#[derive(Parser)]
#[command(name = "newsdeck")]
#[command(about = "Browse, search and bookmark news from the terminal", long_about = None)]
pub struct Cli {
    /// Articles per request (1-100), overrides the config file
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Path to the article database
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show top headlines
    Headlines {
        /// Page to fetch
        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        /// 2-letter country code, defaults to the configured one
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Search all articles
    Search {
        /// Keywords or phrases to search for
        query: String,
        /// Page to fetch
        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: u32,
    },
    /// List saved articles
    Saved,
    /// Remove a saved article
    Remove {
        /// URL of the article to remove
        url: String,
    },
    /// Launch the TUI (default)
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["newsdeck"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from(["newsdeck", "search", "android", "--page", "3"]).unwrap();
        match cli.command {
            Some(Commands::Search { query, page }) => {
                assert_eq!(query, "android");
                assert_eq!(page, 3);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_headlines_defaults() {
        let cli = Cli::try_parse_from(["newsdeck", "--page-size", "50", "headlines"]).unwrap();
        assert_eq!(cli.page_size, Some(50));
        match cli.command {
            Some(Commands::Headlines { page, country }) => {
                assert_eq!(page, 1);
                assert_eq!(country, None);
            }
            _ => panic!("expected headlines"),
        }
    }
}
