use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, warn};

use super::index::TraceIndex;
use super::record::{TRACE_HEADERS, TraceRecord};

/// Counts reported after a trace export has been indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows: usize,
    pub call_sites: usize,
    pub skipped: usize,
}

impl TraceIndex {
    /// Build an index from the CSV export at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, LoadSummary)> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open trace export '{}'", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to load trace export '{}'", path.display()))
    }

    /// Build an index from CSV text with a header row.
    ///
    /// Rows that fail to decode (wrong column count) or whose line number is
    /// not a positive integer are skipped and counted; a missing column in the header or an I/O failure
    /// aborts the load.
    pub fn from_reader<R: Read>(reader: R) -> Result<(Self, LoadSummary)> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers().context("Failed to read trace header")?.clone();
        let missing: Vec<&str> = TRACE_HEADERS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            bail!("Trace header is missing columns: {}", missing.join(", "));
        }

        let mut index = TraceIndex::new();
        let mut summary = LoadSummary::default();
        for row in rdr.deserialize::<TraceRecord>() {
            match row {
                Ok(record) if record.line_number().is_none() => {
                    warn!(filepath = %record.filepath, lineno = %record.lineno, "skipping trace row with invalid line number");
                    summary.skipped += 1;
                }
                Ok(record) => {
                    index.insert(record);
                    summary.rows += 1;
                }
                Err(err) if err.is_io_error() => {
                    return Err(err).context("Failed to read trace row");
                }
                Err(err) => {
                    warn!(line = ?err.position().map(|p| p.line()), "skipping malformed trace row: {}", err);
                    summary.skipped += 1;
                }
            }
        }
        summary.call_sites = index.len();

        debug!(
            rows = summary.rows,
            call_sites = summary.call_sites,
            skipped = summary.skipped,
            "trace export indexed"
        );
        Ok((index, summary))
    }
}
