//! Command line argument parsing for the Kinema CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Kinema - multimodal movie search
#[derive(Parser, Debug, Clone)]
#[command(name = "kinema")]
#[command(about = "Multimodal movie search over fused text and poster embeddings")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct KinemaArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl KinemaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Output formats for command results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch movie metadata and posters from the catalog
    #[command(name = "fetch-catalog")]
    FetchCatalog(FetchCatalogArgs),

    /// Embed records from a CSV feed and upsert them into a collection
    #[command(name = "ingest")]
    Ingest(IngestArgs),

    /// Search a collection with query text plus a query image
    #[command(name = "search")]
    Search(SearchArgs),
}

/// Arguments for the fetch-catalog command.
#[derive(Args, Debug, Clone)]
pub struct FetchCatalogArgs {
    /// Catalog API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Number of discovery pages to fetch
    #[arg(long, default_value_t = 5)]
    pub pages: u32,

    /// Output CSV file for the record feed
    #[arg(long, default_value = "movies.csv")]
    pub output: PathBuf,

    /// Directory to download posters into
    #[arg(long, default_value = "posters")]
    pub posters: PathBuf,
}

/// Arguments for the ingest command.
#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// CSV feed to ingest
    #[arg(long, default_value = "movies.csv")]
    pub csv: PathBuf,

    /// Poster directory used to resolve assets
    #[arg(long, default_value = "posters")]
    pub posters: PathBuf,

    /// Target collection name
    #[arg(long, default_value = "movies")]
    pub collection: String,

    /// Store snapshot file read before and written after the run
    #[arg(long, default_value = "kinema-store.json")]
    pub store: PathBuf,

    /// Maximum records embedded concurrently (0 = number of CPUs)
    #[arg(long, default_value_t = 0)]
    pub concurrency: usize,

    #[command(flatten)]
    pub embedder: EmbedderArgs,
}

/// Arguments for the search command.
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Query text
    #[arg(long)]
    pub text: String,

    /// Query image path
    #[arg(long)]
    pub image: PathBuf,

    /// Collection to search
    #[arg(long, default_value = "movies")]
    pub collection: String,

    /// Store snapshot file to search against
    #[arg(long, default_value = "kinema-store.json")]
    pub store: PathBuf,

    /// Number of matches to return
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    #[command(flatten)]
    pub embedder: EmbedderArgs,
}

/// Embedding backend selection, shared by ingest and search.
///
/// Write and read paths must use the same backend and dimensions, or the
/// query vector will not match the collection.
#[derive(Args, Debug, Clone)]
pub struct EmbedderArgs {
    /// Embedding backend
    #[arg(long, default_value = "hashing")]
    pub embedder: EmbedderKind,

    /// Text embeddings endpoint (remote backend)
    #[arg(long, env = "KINEMA_TEXT_ENDPOINT")]
    pub text_endpoint: Option<String>,

    /// Image embeddings endpoint (remote backend)
    #[arg(long, env = "KINEMA_IMAGE_ENDPOINT")]
    pub image_endpoint: Option<String>,

    /// API key for the embeddings endpoints (remote backend)
    #[arg(long, env = "KINEMA_EMBED_API_KEY", hide_env_values = true)]
    pub embed_api_key: Option<String>,

    /// Model name requested from the text endpoint
    #[arg(long, default_value = "all-mpnet-base-v2")]
    pub text_model: String,

    /// Text embedding dimension
    #[arg(long, default_value_t = 768)]
    pub text_dimension: usize,

    /// Image embedding dimension
    #[arg(long, default_value_t = 512)]
    pub image_dimension: usize,
}

/// Embedding backends selectable from the CLI.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Deterministic hashing embedders (no model runtime)
    Hashing,
    /// Remote inference endpoints
    Remote,
}
