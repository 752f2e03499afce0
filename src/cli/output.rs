//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{KinemaArgs, OutputFormat};
use crate::error::Result;
use crate::ingest::IngestReport;
use crate::query::MovieMatch;
use crate::record::join_list;

/// Result structure for catalog fetches.
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResult {
    pub records: usize,
    pub posters_downloaded: usize,
    pub output: String,
}

/// Print the result of a catalog fetch.
pub fn print_fetch_result(result: &FetchResult, args: &KinemaArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(result, args.pretty)?,
        OutputFormat::Human => {
            println!(
                "Fetched {} records ({} posters) into {}",
                result.records, result.posters_downloaded, result.output
            );
        }
    }
    Ok(())
}

/// Print an ingestion report.
pub fn print_ingest_report(report: &IngestReport, args: &KinemaArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(report, args.pretty)?,
        OutputFormat::Human => {
            println!(
                "Ingested {}/{} records (dimension {}, {} skipped for missing posters, {} failed)",
                report.upserted(),
                report.total,
                report.dimension,
                report.skipped(),
                report.failed()
            );
            if args.verbosity() > 1 {
                for outcome in &report.outcomes {
                    if let Some(error) = &outcome.error {
                        println!("  {}: {error}", outcome.id);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Print ranked search matches.
pub fn print_matches(matches: &[MovieMatch], args: &KinemaArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => print_json(&matches, args.pretty)?,
        OutputFormat::Human => print!("{}", render_matches(matches)),
    }
    Ok(())
}

/// Render matches as a human-readable block per movie.
pub fn render_matches(matches: &[MovieMatch]) -> String {
    let mut response = String::from("Here are some movies that match your query:\n\n");

    if matches.is_empty() {
        response.push_str("No movies found matching your query.\n");
        return response;
    }

    for m in matches {
        response.push_str(&format!("**Title:** {}\n", m.record.title));
        response.push_str(&format!("**Score:** {:.4}\n", m.score));
        response.push_str(&format!("**Overview:** {}\n", m.record.overview));
        response.push_str(&format!("**Genres:** {}\n", join_list(&m.record.genres)));
        response.push_str(&format!("**Cast:** {}\n", join_list(&m.record.cast)));
        response.push_str(&format!(
            "**Poster:** {}\n\n",
            m.record.poster_path.as_deref().unwrap_or("-")
        ));
    }
    response
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
