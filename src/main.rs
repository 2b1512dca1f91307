use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsdeck::app::AppContext;
use newsdeck::cli::{commands, Cli, Commands};
use newsdeck::config::Config;
use newsdeck::fetcher::clamp_page_size;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(page_size) = cli.page_size {
        config.api.page_size = clamp_page_size(page_size);
    }

    let ctx = AppContext::new(config, cli.db)?;

    match cli.command {
        Some(Commands::Headlines { page, country }) => {
            commands::headlines(&ctx, country.as_deref(), page).await?;
        }
        Some(Commands::Search { query, page }) => {
            commands::search(&ctx, &query, page).await?;
        }
        Some(Commands::Saved) => {
            commands::list_saved(&ctx)?;
        }
        Some(Commands::Remove { url }) => {
            commands::remove(&ctx, &url)?;
        }
        Some(Commands::Tui) | None => {
            newsdeck::tui::run(Arc::new(ctx)).await?;
        }
    }

    Ok(())
}
