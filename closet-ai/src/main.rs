//! closet-ai - Outfit suggestion command line tool
//!
//! Reads a catalog snapshot (`{"tops": [...], "bottoms": [...]}`), ranks every
//! retained top/bottom pair and prints the best suggestions plus a weekly plan.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use closet_ai::oracle::{AdapterSettings, GeminiTransport, OracleAdapter, OutfitOracle};
use closet_ai::{ClothingItem, SuggestionGenerator, WeeklyPlanner};
use closet_common::config::{resolve_oracle_config, TomlConfig};
use closet_common::events::EventBus;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for closet-ai
#[derive(Parser, Debug)]
#[command(name = "closet-ai")]
#[command(about = "Rank outfit suggestions for a closet catalog")]
#[command(version)]
struct Args {
    /// Catalog snapshot JSON file
    catalog: PathBuf,

    /// Configuration file (defaults to ~/.config/closet-fusion/config.toml)
    #[arg(short, long, env = "CLOSET_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for sampling and weekly fill
    #[arg(long)]
    seed: Option<u64>,

    /// Number of suggestions to print
    #[arg(short = 'n', long, default_value = "12")]
    limit: usize,

    /// Only test oracle connectivity, then exit
    #[arg(long)]
    check_oracle: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogSnapshot {
    #[serde(default)]
    tops: Vec<ClothingItem>,
    #[serde(default)]
    bottoms: Vec<ClothingItem>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting closet-ai v{}", env!("CARGO_PKG_VERSION"));

    let oracle_config = resolve_oracle_config(&config);
    let transport = GeminiTransport::new(&oracle_config)
        .context("Failed to initialize oracle transport")?;
    let oracle = Arc::new(OracleAdapter::new(
        transport,
        AdapterSettings::from(&oracle_config),
    ));

    if args.check_oracle {
        let healthy = oracle.test_connection().await;
        println!("oracle reachable: {}", healthy);
        return Ok(());
    }

    let raw = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("Failed to read catalog {}", args.catalog.display()))?;
    let snapshot: CatalogSnapshot =
        serde_json::from_str(&raw).context("Failed to parse catalog JSON")?;
    info!(
        tops = snapshot.tops.len(),
        bottoms = snapshot.bottoms.len(),
        "Catalog loaded"
    );

    let event_bus = EventBus::new(100);
    let mut generator = SuggestionGenerator::new(oracle)
        .with_settings(config.generation.clone())
        .with_sink(Arc::new(event_bus.clone()))
        .with_event_bus(event_bus);
    let planner = match args.seed {
        Some(seed) => {
            generator = generator.with_seed(seed);
            WeeklyPlanner::with_seed(seed)
        }
        None => WeeklyPlanner::new(),
    };

    let suggestions = generator
        .generate(&snapshot.tops, &snapshot.bottoms)
        .await
        .context("Suggestion generation failed")?;

    let catalog: Vec<ClothingItem> = snapshot
        .tops
        .iter()
        .chain(snapshot.bottoms.iter())
        .cloned()
        .collect();
    let label = |id: &str| {
        catalog
            .iter()
            .find(|item| item.id == id)
            .map(ClothingItem::label)
            .unwrap_or_else(|| id.to_string())
    };

    println!("Top suggestions ({} total):", suggestions.len());
    for (rank, suggestion) in suggestions.iter().take(args.limit).enumerate() {
        println!(
            "{:>3}. {:.2}  {} + {}\n       {}",
            rank + 1,
            suggestion.score(),
            label(suggestion.top_id()),
            label(suggestion.bottom_id()),
            suggestion.match_reason()
        );
    }

    let plan = planner.plan(&suggestions, &catalog);
    println!("\nWeekly plan:");
    for day in &plan.days {
        println!(
            "  {}  {:.2}  {} + {}",
            day.day,
            day.suggestion.score(),
            label(day.suggestion.top_id()),
            label(day.suggestion.bottom_id())
        );
    }

    Ok(())
}
