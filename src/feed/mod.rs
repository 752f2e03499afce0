//! CSV boundary for the source record feed.
//!
//! The feed persists scraped catalog records as flat CSV and reads them
//! back for ingestion. List-valued fields (genres, cast) are stored as
//! `", "`-joined strings in the CSV and converted to typed lists here — the
//! only place the joined representation exists.
//!
//! Poster references are resolved against a poster directory by the
//! filename convention used at download time, matched case-insensitively.
//! Records whose poster cannot be resolved keep a `None` reference and are
//! skipped later by the ingestion pipeline, which logs them.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use csv::{ReaderBuilder, WriterBuilder};
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{join_list, split_list, MovieRecord};

/// Flat CSV row shape; lists are `", "`-joined strings here and nowhere
/// else.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    title: String,
    overview: String,
    genres: String,
    cast: String,
    poster_url: String,
}

/// Compute the poster filename for a title: characters unsafe in filenames
/// are stripped and a `.jpg` extension appended.
pub fn poster_filename(title: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r#"[\\/:"*?<>|]+"#).unwrap());
    format!("{}.jpg", unsafe_chars.replace_all(title, ""))
}

/// CSV reader/writer for movie records.
#[derive(Debug, Clone)]
pub struct CsvFeed {
    /// CSV delimiter character (default: ',')
    delimiter: u8,
}

impl Default for CsvFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFeed {
    /// Create a feed with comma delimiter.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set a custom delimiter character.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter as u8;
        self
    }

    /// Load records from a CSV file.
    ///
    /// When `poster_dir` is given, each record's poster reference is
    /// resolved against the files in that directory by the download
    /// filename convention (case-insensitive); unresolved posters become
    /// `None`. Without a poster directory the `poster_url` column is taken
    /// as-is.
    pub fn load<P: AsRef<Path>>(
        &self,
        csv_path: P,
        poster_dir: Option<&Path>,
    ) -> Result<Vec<MovieRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(csv_path.as_ref())?;

        let poster_files = match poster_dir {
            Some(dir) => Some(list_files(dir)?),
            None => None,
        };

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let row: CsvRow = row?;
            let poster = match (&poster_files, poster_dir) {
                (Some(files), Some(dir)) => {
                    resolve_poster(&row.title, files, dir).or_else(|| {
                        warn!("poster file not found for '{}'", row.title);
                        None
                    })
                }
                _ => {
                    if row.poster_url.is_empty() {
                        None
                    } else {
                        Some(row.poster_url.clone())
                    }
                }
            };
            records.push(MovieRecord::new(
                row.title,
                row.overview,
                split_list(&row.genres),
                split_list(&row.cast),
                poster,
            ));
        }
        Ok(records)
    }

    /// Save records to a CSV file, joining list fields.
    pub fn save<P: AsRef<Path>>(&self, records: &[MovieRecord], csv_path: P) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(csv_path.as_ref())?;
        for record in records {
            let row = CsvRow {
                title: record.title.clone(),
                overview: record.overview.clone(),
                genres: join_list(&record.genres),
                cast: join_list(&record.cast),
                poster_url: record.poster_path.clone().unwrap_or_default(),
            };
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

fn resolve_poster(title: &str, files: &[String], dir: &Path) -> Option<String> {
    let wanted = poster_filename(title);
    files
        .iter()
        .find(|f| f.eq_ignore_ascii_case(&wanted))
        .map(|f| dir.join(f).to_string_lossy().into_owned())
}
