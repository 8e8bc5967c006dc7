use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelshelf")]
#[command(author, version, about = "Browse and search TMDB from the command line")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show popular movies
    Popular {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show a curated listing (popular, now_playing, top_rated, upcoming, trending, trending_week)
    Listing {
        kind: String,

        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show full details for one or more movie ids
    Details {
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Extra append_to_response sections
        #[arg(long, value_delimiter = ',')]
        append: Vec<String>,
    },

    /// Search movies by text, optionally narrowed by genre and filters
    Search {
        query: String,

        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Genre id
        #[arg(long)]
        genre: Option<i64>,

        #[arg(long)]
        year: Option<i32>,

        /// Minimum vote average
        #[arg(long)]
        min_rating: Option<f64>,

        /// Client-side sort, e.g. popularity.desc
        #[arg(long)]
        sort: Option<String>,
    },

    /// Discover movies by filters
    Discover {
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(long)]
        genre: Option<i64>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        min_rating: Option<f64>,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        sort: Option<String>,
    },

    /// List the genre catalogue, optionally filtered by name
    Genres {
        filter: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
