//! Quote CLI
//!
//! Prices a quote request against a catalog snapshot and prints the result as a
//! table or JSON. Also inspects BT power tiers and the effective configuration.

mod input;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use pricing_engine::{derating, EngineConfig, KFactor, QuoteEngine};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "quote-cli")]
#[command(about = "Price transformer quotes against a catalog snapshot")]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format override (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price every item of a quote request
    Price {
        /// Catalog snapshot (JSON array of rows)
        #[arg(long)]
        catalog: PathBuf,

        /// Quote request (JSON)
        quote: PathBuf,

        /// Print the priced quote as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Print the per-stage breakdown of every item
        #[arg(long)]
        breakdown: bool,
    },

    /// List BT power tiers and optionally resolve a requested power
    Tiers {
        #[arg(long)]
        catalog: PathBuf,

        /// Product key, e.g. "TRAFO SECO"
        #[arg(long)]
        product: String,

        /// Material key, e.g. "COBRE"
        #[arg(long)]
        material: String,

        /// Requested power in kVA
        #[arg(long)]
        power: Option<Decimal>,

        /// K-factor of the load
        #[arg(short, long, default_value = "1")]
        k_factor: u8,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.log_level, cli.log_format)?;
    logging::initialize_logging(&config.logging.level, &config.logging.format)?;

    info!("quote-cli v{} (engine v{})", env!("CARGO_PKG_VERSION"), pricing_engine::VERSION);

    match cli.command {
        Commands::Price { catalog, quote, json, breakdown } => {
            price(config, &catalog, &quote, json, breakdown)
        }
        Commands::Tiers { catalog, product, material, power, k_factor } => {
            tiers(&catalog, &product, &material, power, k_factor)
        }
        Commands::Config { output } => show_config(&config, output.as_deref()),
    }
}

/// File (or defaults), then `QUOTE_*` environment, then command line flags
fn load_config(
    path: Option<&Path>,
    log_level: Option<String>,
    log_format: Option<String>,
) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path).context("Failed to load configuration")?,
        None => EngineConfig::default(),
    };
    config.apply_env().context("Invalid QUOTE_* environment override")?;

    if let Some(level) = log_level {
        config.logging.level = level;
    }
    if let Some(format) = log_format {
        config.logging.format = format;
    }
    config.validate().context("Invalid command line override")?;

    Ok(config)
}

fn price(config: EngineConfig, catalog: &Path, quote: &Path, json: bool, breakdown: bool) -> Result<()> {
    let catalog = Arc::new(input::load_catalog(catalog)?);
    let request = input::load_quote(quote)?;

    let engine = QuoteEngine::new(config, catalog);
    let priced = engine
        .price_quote(&request.tax, &request.items)
        .with_context(|| format!("Failed to price quote {}", quote.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&priced)?);
        return Ok(());
    }

    println!("{}", format!("Quote {}", quote.display()).bold());
    print!("{}", report::render_table(&priced));

    if breakdown {
        for item in &priced.items {
            println!();
            print!("{}", report::render_breakdown(item));
        }
    }

    Ok(())
}

fn tiers(
    catalog: &Path,
    product: &str,
    material: &str,
    power: Option<Decimal>,
    k_factor: u8,
) -> Result<()> {
    let catalog = input::load_catalog(catalog)?;
    let k_factor = KFactor::try_from(k_factor)?;

    println!("{}", format!("{product} / {material}").bold());
    for entry in catalog.tier_entries(product, material)? {
        println!("  {:>10} kVA  {:<20} {:>14}", entry.nominal_power, entry.id, entry.base_price);
    }

    if let Some(power) = power {
        let equivalent = derating::equivalent_power(power, k_factor)?;
        let entry = catalog.select_tier(product, material, equivalent)?;
        println!();
        println!(
            "{} kVA at {} needs {} kVA -> {}",
            power,
            k_factor,
            equivalent.round_dp(2),
            entry.id.green()
        );
    }

    Ok(())
}

fn show_config(config: &EngineConfig, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            config.to_file(path)?;
            println!("Configuration written to {}", path.display());
        }
        None => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
