use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use seatchecker::config;
use seatchecker::ryanair::seatmap::{distinct_rows, row_count_by_max_row, row_count_by_row_list};
use seatchecker::ryanair::RyanairClient;

/// Print every row-count reading of an aircraft model's seat map.
#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Aircraft model, as reported by the seats query (e.g. 73H)
    #[arg(long)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    let client = RyanairClient::from_config(&cfg)?;

    let map = client.seat_map(&args.model).await?;
    let rows: Vec<u32> = map
        .seat_rows
        .iter()
        .flatten()
        .filter_map(|row| row.iter().find_map(|seat| seat.row))
        .collect();
    println!("Aircraft model: {}", args.model);
    println!("Row numbers: {:?}", rows);
    println!("  row list length: {}", row_count_by_row_list(&map));
    println!("  max row number:  {}", row_count_by_max_row(&map));
    println!("  distinct rows:   {}", distinct_rows(&map));
    println!("Configured method: {:?}", cfg.ryanair.row_count);
    Ok(())
}
