use anyhow::{Context, Result};
use csv_server::census::{BroadbandLookup, CensusClient};
use csv_server::config::Config;
use csv_server::logging::init_tracing;
use csv_server::server::{self, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn print_help() {
    println!("csv-server - load, view and search a CSV file over HTTP");
    println!();
    println!("Usage:");
    println!("  csv-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <path>      - Read configuration from <path>");
    println!("  --port <n>           - Listen on port <n> instead of the configured one");
    println!("  --generate-config    - Write a commented default config file and exit");
    println!("  --help               - Show this help");
    println!();
    println!("Endpoints:");
    println!("  GET /loadcsv?filepath=<path>&header=<true|false>");
    println!("  GET /viewcsv");
    println!("  GET /searchcsv?search=<word>&header=<true|false>&narrow=<ind:N|column>");
    println!("  GET /broadband?state=<name>&county=<name>");
    println!("  GET /logs?count=<n>");
    println!();
}

/// Value following `flag`, if the flag is present
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
}

fn generate_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    println!("Configuration file created at: {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    let config_path = flag_value(&args, "--config").map(PathBuf::from);

    if args.iter().any(|arg| arg == "--generate-config") {
        return generate_config(config_path);
    }

    // .env is optional
    dotenv::dotenv().ok();

    let mut config = Config::load(config_path.as_deref()).context("Failed to load config")?;
    config.apply_env();

    if let Some(port) = flag_value(&args, "--port") {
        config.server.port = port
            .parse()
            .with_context(|| format!("Invalid --port value '{}'", port))?;
    }

    let logs = init_tracing(&config.logging);

    info!(
        "Census API at {} (timeout {}s, api key: {})",
        config.census.base_url,
        config.census.timeout_secs,
        config.census.api_key.is_some()
    );

    let census = CensusClient::new(config.census.clone()).context("Failed to build Census client")?;
    let broadband = BroadbandLookup::new(Arc::new(census), config.census.statistic_variable.clone());

    let app = server::router(AppState::new(broadband, logs), config.server.cors);
    server::serve(&config.server.bind_address(), app).await
}
