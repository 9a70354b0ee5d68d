//! jobscrape CLI
//!
//! Fetches one page and prints what it extracted as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};

use jobscrape::llm::{run_llm, LlmArgs};
use jobscrape::logging;
use jobscrape::scrape::{run_scrape, ScrapeArgs};

#[derive(Parser)]
#[command(name = "jobscrape")]
#[command(version)]
#[command(about = "Extract job listings and page summaries as JSON")]
#[command(long_about = "Extract job listings and page summaries as JSON.\n\nCommands:\n  scrape   CSS-selector extraction (job board listing or generic page)\n  llm      Language-model extraction of listing fields")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract with CSS selectors
    Scrape(ScrapeArgs),
    /// Extract listing fields with a language model (needs OPENAI_API_KEY)
    Llm(LlmArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape(args) => run_scrape(args).await,
        Commands::Llm(args) => run_llm(args).await,
    }
}
