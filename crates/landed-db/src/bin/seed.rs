//! # Sample Schedule Loader
//!
//! Loads the sample tariff schedule into SQLite and prints the reference
//! landed-cost calculations.
//!
//! ## Usage
//! ```bash
//! # Database from config / environment (LANDED_DB_PATH)
//! cargo run -p landed-db --bin seed
//!
//! # Explicit database or config file
//! cargo run -p landed-db --bin seed -- --db ./data/hts.db
//! cargo run -p landed-db --bin seed -- --config ./landed.toml
//!
//! # Results as JSON instead of a table
//! cargo run -p landed-db --bin seed -- --json
//! ```
//!
//! Logging follows `RUST_LOG` (default `info,landed=debug,sqlx=warn`).

use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use landed_core::schedule::sample_records;
use landed_core::{CoreError, HtsCode, Money, ShipmentParameters};
use landed_db::{AppConfig, Database, LandedCostService};

/// (code, product cost, freight, insurance) in whole dollars; 500 kg, 5 units.
const REFERENCE_SHIPMENTS: &[(&str, i64, i64, i64)] = &[
    ("0101.30.00.00", 10_000, 500, 100),
    ("0102.21.00.00", 5_000, 250, 50),
    ("0201.10.00.00", 8_000, 400, 80),
    ("9999.99.99.99", 1_000, 0, 0),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,landed=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Landed Sample Schedule Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (overrides config)");
                println!("  -c, --config <PATH>   Config file (default: platform config dir)");
                println!("      --json            Print results as JSON");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    println!("🌱 Landed Sample Schedule Loader");
    println!("================================");
    println!("Database: {}", config.database.path.display());
    println!("Headline: {}", config.calculator.headline_column.label());
    println!();

    let db = Database::new(config.db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let records = sample_records();
    let start = std::time::Instant::now();
    let written = db.hts_rates().replace_all(&records).await?;
    println!("✓ Loaded {} tariff lines in {:?}", written, start.elapsed());

    println!();
    println!("Verifying search...");
    let hits = db.hts_rates().search("purebred", 10).await?;
    println!("  Search 'purebred': {} results", hits.len());

    println!();
    println!("Sections:");
    for summary in db.hts_rates().section_summary().await? {
        println!(
            "  {:<6} {:>3} lines  {}",
            summary.section.numeral(),
            summary.item_count,
            summary.section.title()
        );
    }

    println!();
    println!("Reference calculations (500 kg, 5 units):");

    let service = LandedCostService::new(&db, config.calculator_config());
    for (code, cost, freight, insurance) in REFERENCE_SHIPMENTS {
        let shipment = ShipmentParameters {
            hts_code: HtsCode::parse(code)?,
            product_cost: Money::from_dollars(*cost),
            freight: Money::from_dollars(*freight),
            insurance: Money::from_dollars(*insurance),
            unit_weight: 500.0,
            quantity: 5,
        };

        match service.calculate(&shipment).await {
            Ok(result) if json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(result) => {
                println!();
                println!("  {} {}", result.hts_code, result.description);
                println!("    CIF value:   {:>14}", result.cif_value.to_string());
                for (column, line) in &result.duties {
                    println!(
                        "    {:<22} {:>10}  {}",
                        column.label(),
                        line.rate_text,
                        line.amount
                    );
                }
                println!("    Total duty:  {:>14}", result.total_duty.to_string());
                println!("    Landed cost: {:>14}", result.landed_cost.to_string());
                for warning in &result.warnings {
                    println!("    ⚠ {:?}", warning);
                }
            }
            Err(CoreError::HtsCodeNotFound { code, suggestions }) => {
                println!();
                println!("  {}: no data found", code);
                if !suggestions.is_empty() {
                    let list: Vec<&str> = suggestions.iter().map(HtsCode::as_str).collect();
                    println!("    Did you mean: {}", list.join(", "));
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
