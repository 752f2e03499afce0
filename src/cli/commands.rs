//! Command implementations for the Kinema CLI.
//!
//! Commands construct their collaborators explicitly — embedders, store,
//! manager, pipelines — and pass them down; nothing is captured from
//! process-wide state.

use std::sync::Arc;

use log::info;

use crate::catalog::CatalogClient;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::embedding::hashing::{HashingTextEmbedder, HistogramImageEmbedder};
use crate::embedding::remote::{RemoteImageEmbedder, RemoteTextEmbedder};
use crate::embedding::FusionEmbedder;
use crate::error::{KinemaError, Result};
use crate::feed::CsvFeed;
use crate::ingest::{IngestConfig, IngestPipeline};
use crate::query::{SearchPipeline, SearchRequest};
use crate::store::{IndexManager, MemoryVectorStore};

/// Execute a CLI command.
pub async fn execute_command(args: KinemaArgs) -> Result<()> {
    match &args.command {
        Command::FetchCatalog(fetch_args) => fetch_catalog(fetch_args.clone(), &args).await,
        Command::Ingest(ingest_args) => ingest(ingest_args.clone(), &args).await,
        Command::Search(search_args) => search(search_args.clone(), &args).await,
    }
}

async fn fetch_catalog(args: FetchCatalogArgs, cli_args: &KinemaArgs) -> Result<()> {
    let client = CatalogClient::new(&args.api_key)?;
    let records = client.fetch_records(args.pages).await?;
    let downloaded = client.download_posters(&records, &args.posters).await?;

    CsvFeed::new().save(&records, &args.output)?;
    print_fetch_result(
        &FetchResult {
            records: records.len(),
            posters_downloaded: downloaded,
            output: args.output.display().to_string(),
        },
        cli_args,
    )
}

async fn ingest(args: IngestArgs, cli_args: &KinemaArgs) -> Result<()> {
    let records = CsvFeed::new().load(&args.csv, Some(args.posters.as_path()))?;
    info!("loaded {} records from {}", records.len(), args.csv.display());

    let fusion = build_fusion(&args.embedder)?;
    let store = open_store(&args.store)?;
    let manager = Arc::new(IndexManager::new(store.clone()));

    let config = IngestConfig {
        collection: args.collection.clone(),
        concurrency: match args.concurrency {
            0 => num_cpus::get(),
            n => n,
        },
        ..IngestConfig::default()
    };
    let pipeline = IngestPipeline::new(fusion, manager, config);
    let report = pipeline.run(records).await?;

    store.save_to_path(&args.store)?;
    print_ingest_report(&report, cli_args)
}

async fn search(args: SearchArgs, cli_args: &KinemaArgs) -> Result<()> {
    let fusion = build_fusion(&args.embedder)?;
    let store = open_store(&args.store)?;
    let manager = Arc::new(IndexManager::new(store));

    let pipeline = SearchPipeline::new(fusion, manager, &args.collection);
    let request = SearchRequest::new(
        &args.text,
        args.image.to_string_lossy().into_owned(),
    )
    .with_top_k(args.top_k);

    let matches = pipeline.search(&request).await?;
    print_matches(&matches, cli_args)
}

fn open_store(path: &std::path::Path) -> Result<Arc<MemoryVectorStore>> {
    let store = if path.exists() {
        MemoryVectorStore::load_from_path(path)?
    } else {
        MemoryVectorStore::new()
    };
    Ok(Arc::new(store))
}

fn build_fusion(args: &EmbedderArgs) -> Result<Arc<FusionEmbedder>> {
    let fusion = match args.embedder {
        EmbedderKind::Hashing => FusionEmbedder::new(
            Arc::new(HashingTextEmbedder::new(args.text_dimension)),
            Arc::new(HistogramImageEmbedder::new(args.image_dimension)),
        ),
        EmbedderKind::Remote => {
            let text_endpoint = args.text_endpoint.as_deref().ok_or_else(|| {
                KinemaError::invalid_config("remote backend requires --text-endpoint")
            })?;
            let image_endpoint = args.image_endpoint.as_deref().ok_or_else(|| {
                KinemaError::invalid_config("remote backend requires --image-endpoint")
            })?;
            let api_key = args.embed_api_key.as_deref().unwrap_or_default();
            FusionEmbedder::new(
                Arc::new(RemoteTextEmbedder::new(
                    text_endpoint,
                    api_key,
                    &args.text_model,
                    args.text_dimension,
                )?),
                Arc::new(RemoteImageEmbedder::new(
                    image_endpoint,
                    api_key,
                    args.image_dimension,
                )?),
            )
        }
    };
    Ok(Arc::new(fusion))
}
