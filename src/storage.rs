//! Per-channel record files.
//!
//! Records live in `<dir>/<channel>.csv`: UTF-8 with a byte-order mark so spreadsheet
//! tools pick the right encoding, and the three `RECORD_HEADERS` columns.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{VideoLinkRecord, RECORD_HEADERS};
use crate::utils::sanitize_filename;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Where records of earlier runs are kept.
pub trait RecordStore {
    /// Records saved for `channel`, or `None` if it was never scraped.
    fn load(&self, channel: &str) -> Result<Option<Vec<VideoLinkRecord>>, StoreError>;

    /// Replace everything saved for `channel`. Returns where it went.
    fn persist(&self, channel: &str, records: &[VideoLinkRecord]) -> Result<PathBuf, StoreError>;
}

/// CSV files in one directory, one per channel.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the records of `channel`.
    pub fn path_for(&self, channel: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sanitize_filename(channel)))
    }
}

impl RecordStore for CsvStore {
    fn load(&self, channel: &str) -> Result<Option<Vec<VideoLinkRecord>>, StoreError> {
        let path = self.path_for(channel);
        if !path.exists() {
            debug!("No record file at {}", path.display());
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let records = parse_records(&bytes).map_err(|source| StoreError::Csv {
            path: path.clone(),
            source,
        })?;

        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Some(records))
    }

    fn persist(&self, channel: &str, records: &[VideoLinkRecord]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(channel);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write beside the target and rename, so a failed write keeps the old file.
        let partial = path.with_extension("csv.partial");
        let written = write_file(&partial, records)
            .map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })
            .and_then(|()| fs::rename(&partial, &path).map_err(io_err));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&partial) {
                debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }

        info!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }
}

fn write_file(path: &Path, records: &[VideoLinkRecord]) -> Result<(), csv::Error> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    write_records(file, records)
}

/// Parse a record file, with or without a leading byte-order mark.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<VideoLinkRecord>, csv::Error> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    csv::ReaderBuilder::new()
        .from_reader(body)
        .deserialize()
        .collect()
}

/// Write the header row and `records` (no byte-order mark).
pub fn write_records<W: Write>(writer: W, records: &[VideoLinkRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(RECORD_HEADERS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
