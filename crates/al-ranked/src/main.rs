//! al-ranked CLI application.

use al_ranked::{
    AniListClient, AniListFetcher, CacheManager, Category, RankingRunner, RunContext,
    EXIT_CATEGORY_FAILED, EXIT_STARTUP_FAILED, EXIT_SUCCESS,
};
use anyhow::{Context, Result};
use clap::Parser;
use shared::{CategoryConfig, Config, OutputPaths};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export AniList rankings to CSV", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only run the named category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Validate the configuration and categories, then exit
    #[arg(long)]
    check: bool,

    /// Write the default configuration to PATH and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Clear cache before running
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let result = run(args).await;
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }
    ExitCode::from(exit_status(&result))
}

/// 0 when every category succeeded, 1 when any failed, 2 when the run never started
fn exit_status(result: &Result<u8>) -> u8 {
    match result {
        Ok(status) => *status,
        Err(_) => EXIT_STARTUP_FAILED,
    }
}

async fn run(args: Args) -> Result<u8> {
    if let Some(path) = &args.write_config {
        Config::default()
            .save(path)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        println!("Default configuration written to {}", path.display());
        return Ok(EXIT_SUCCESS);
    }

    // Load configuration
    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.to_string_lossy().to_string();
    }

    // Initialize logging
    let log_config = shared::LogConfig::from_settings(
        &config.logging,
        &config.log_dir(),
        "al-ranked",
        args.verbose,
    )?;
    shared::logging::init(log_config)?;

    info!("al-ranked starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    let categories = config.select_categories(&args.categories)?;

    if args.check {
        return Ok(if check(&categories) {
            EXIT_SUCCESS
        } else {
            EXIT_CATEGORY_FAILED
        });
    }

    // Initialize output paths
    let paths = OutputPaths::new(config.output_dir());
    paths
        .create_dirs()
        .with_context(|| format!("Failed to create output directory {}", paths.root().display()))?;

    // Initialize cache
    let cache = CacheManager::new(
        config.cache_dir(),
        config.cache.enabled,
        config.cache.expiration_seconds,
    )
    .context("Failed to initialize cache")?;

    if args.clear_cache {
        info!("Clearing cache");
        cache.clear().context("Failed to clear cache")?;
    }

    if cache.is_enabled() {
        let cache_stats = cache.stats().context("Failed to get cache stats")?;
        info!(
            cached_files = cache_stats.total_files,
            cache_size_kb = cache_stats.total_size_bytes / 1_000,
            "Cache statistics"
        );
    }

    // Initialize API client
    let client = AniListClient::new(&config.api).context("Failed to create AniList client")?;
    let fetcher = AniListFetcher::new(client, cache);

    let mut runner = RankingRunner::new(RunContext {
        source: fetcher,
        paging: config.api.paging,
        paths,
    });

    let report = runner.run(&categories).await;

    info!("=== Ranking Complete ===");
    for (name, summary) in report.succeeded() {
        info!(
            "{}: {} rows ranked by {} -> {}",
            name,
            summary.rows,
            summary.criterion,
            summary.path.display()
        );
    }
    for (name, e) in report.failed() {
        error!("{}: {} ({})", name, e, e.kind());
    }
    info!("Succeeded: {}", report.succeeded().count());
    info!("Failed: {}", report.failed().count());
    info!("Elapsed: {}ms", report.elapsed().num_milliseconds());

    Ok(report.exit_status())
}

/// Resolve every category without touching the network
fn check(categories: &[CategoryConfig]) -> bool {
    let mut valid = true;

    for config in categories {
        match Category::from_config(config) {
            Ok(category) => println!(
                "ok      {}: {} ranked by {}",
                category.name, category.filter, category.criterion
            ),
            Err(e) => {
                valid = false;
                println!("invalid {}: {}", config.name, e);
            }
        }
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Ok(EXIT_SUCCESS)), 0);
        assert_eq!(exit_status(&Ok(EXIT_CATEGORY_FAILED)), 1);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("bad config"))), 2);
    }

    #[test]
    fn test_check_flags_invalid_category() {
        assert!(check(&[CategoryConfig::new("All Anime", "anime")]));
        assert!(!check(&[
            CategoryConfig::new("All Anime", "anime"),
            CategoryConfig::new("Broken", "anime").with_status("AIRING"),
        ]));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["al-ranked", "--category", "All Anime", "--category", "All Manga", "-v"]);
        assert_eq!(args.categories, vec!["All Anime", "All Manga"]);
        assert!(args.verbose);
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }
}
