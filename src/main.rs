mod cli;

use reelshelf::config;
use reelshelf::metadata::{Filters, ListingKind, SearchCriteria, Tmdb};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::Path;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_filters(
    genre: Option<i64>,
    year: Option<i32>,
    min_rating: Option<f64>,
    language: Option<String>,
    sort: Option<String>,
) -> Filters {
    let mut criteria = SearchCriteria::new();
    if let Some(genre) = genre {
        criteria = criteria.with_genre(genre);
    }
    if let Some(year) = year {
        criteria = criteria.with_year(year);
    }
    if let Some(min_rating) = min_rating {
        criteria = criteria.with_rating(min_rating, 100);
    }
    if let Some(language) = language {
        criteria = criteria.with_original_language(&language);
    }
    if let Some(sort) = sort {
        criteria = criteria.with_sorting(&sort);
    }
    criteria.build()
}

async fn run(command: Commands, config_path: Option<&Path>) -> Result<()> {
    let tmdb = || -> Result<Tmdb> {
        let config = config::load_config_or_default(config_path)?;
        Tmdb::from_config(&config).context("Failed to initialise TMDB client")
    };

    match command {
        Commands::Popular { page } => print_json(&tmdb()?.popular(page).await?),
        Commands::Listing { kind, page } => {
            let kind: ListingKind = kind.parse().map_err(anyhow::Error::msg)?;
            print_json(&tmdb()?.listing(kind, page).await?)
        }
        Commands::Details { ids, append } => {
            let tmdb = tmdb()?;
            let append: Vec<&str> = append.iter().map(String::as_str).collect();
            if let [id] = ids.as_slice() {
                print_json(&tmdb.movie_details(*id, &append).await?)
            } else {
                print_json(&tmdb.movies_by_ids(&ids, &append).await?)
            }
        }
        Commands::Search {
            query,
            page,
            genre,
            year,
            min_rating,
            sort,
        } => {
            let filters = build_filters(genre, year, min_rating, None, sort);
            print_json(&tmdb()?.search_movies(&query, page, &filters).await?)
        }
        Commands::Discover {
            page,
            genre,
            year,
            min_rating,
            language,
            sort,
        } => {
            let filters = build_filters(genre, year, min_rating, language, sort);
            print_json(&tmdb()?.discover(&filters, page).await?)
        }
        Commands::Genres { filter } => {
            let tmdb = tmdb()?;
            match filter {
                Some(term) => print_json(&tmdb.search_genres(&term).await?),
                None => print_json(&tmdb.genres().await?),
            }
        }
        Commands::Validate { config } => validate_config(config.as_deref().or(config_path)),
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, checking default locations");
            let config = config::load_config_or_default(None)?;
            config::validate_config(&config)?;
            config
        }
    };

    println!("✓ Configuration is valid");
    println!("  Base URL: {}", config.tmdb.base_url);
    println!(
        "  API key: {}",
        if config.tmdb.api_key.trim().is_empty() {
            "missing"
        } else {
            "set"
        }
    );
    println!(
        "  Cache TTL: {}s dynamic, {}s static",
        config.cache.dynamic_ttl_secs, config.cache.static_ttl_secs
    );
    println!("  Rate limit: {}ms between calls", config.rate_limiting.delay_ms);
    println!(
        "  Genre scan: {} pages, {} results per page",
        config.search.max_pages_per_query, config.search.results_per_page
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelshelf=trace,reqwest=debug".to_string()
        } else {
            "reelshelf=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli.command, cli.config.as_deref()))
}
