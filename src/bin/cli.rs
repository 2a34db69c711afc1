//! Price scraper CLI
//!
//! Scrapes current TV prices from the configured retailers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use price_scraper::{
    error::{AppError, Result},
    models::{Config, ProductQuery},
    pipeline::{self, ScrapeRequest},
    services::ALL_RETAILERS,
};

/// Price Scraper - TV price comparison across retailers
#[derive(Parser, Debug)]
#[command(
    name = "price-scraper",
    version,
    about = "Scrapes current TV prices from retailer search pages"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape prices for one product or a JSON product list
    Scrape {
        /// Retailer id, or "all"
        #[arg(short, long, default_value = ALL_RETAILERS)]
        retailer: String,

        /// Single product name to search for
        #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
        product: Option<String>,

        /// JSON file with an array of {"name": ...} objects
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: <results_dir>/<retailer>_prices_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print results without saving them
        #[arg(long)]
        no_save: bool,
    },

    /// List configured retailers
    Retailers,

    /// Validate the configuration file
    Validate,

    /// Delete all cached responses
    ClearCache,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Using configuration from {}", cli.config.display());

    match cli.command {
        Command::Scrape {
            retailer,
            product,
            input,
            output,
            no_save,
        } => {
            let products = match (product, input) {
                (Some(name), _) => vec![ProductQuery::new(name)],
                (None, Some(path)) => pipeline::load_products(&path).await?,
                (None, None) => {
                    return Err(AppError::config("Either --product or --input is required"));
                }
            };
            if products.is_empty() {
                log::warn!("No products to scrape");
                return Ok(());
            }

            let request = ScrapeRequest {
                retailer,
                products,
                output,
                save: !no_save,
            };
            let outcome = pipeline::run_scrape(&config, &request).await?;
            print!("{}", pipeline::scrape::render_results(&outcome.groups));
        }

        Command::Retailers => {
            print!("{}", pipeline::render_retailers(&config));
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }

        Command::ClearCache => {
            pipeline::run_clear_cache(&config).await?;
        }
    }

    Ok(())
}
