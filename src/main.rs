use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use mapstitch::config::load_config;
use mapstitch::download::HttpFetcher;
use mapstitch::model::TileConstraints;
use mapstitch::render::MapBuilder;
use mapstitch::stitch::save_canvas;

#[derive(Parser)]
#[command(author, version, about = "Download a static map larger than the provider's size limit", long_about = None)]
struct Cli {
    /// Path to JSON configuration file
    config: PathBuf,

    /// Output file location; the extension picks the image format
    #[arg(short, long, default_value = "map.png")]
    outfile: PathBuf,

    /// Seconds to wait for each tile request
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Error parsing config file {}", cli.config.display()))?;

    let builder = MapBuilder::new(config, TileConstraints::default());
    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout_secs));

    let canvas = builder.build(&fetcher)
        .context("Failed to build map")?;

    save_canvas(canvas, &cli.outfile)
        .with_context(|| format!("Error writing output image {}", cli.outfile.display()))?;

    info!("Done");
    Ok(())
}
