//! CSV export for the request journal.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::journal::JournalEntry;

/// Column header for CSV journal export.
const HEADER: &str = "seq,method,uri,handler,status";

/// Exports journal entries to a CSV file at the given path.
///
/// Writes a header row followed by one row per served request, in arrival
/// order.
///
/// # Arguments
///
/// * `entries` - Journal entries
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(entries: &[JournalEntry], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(entries, buf)
}

/// Writes journal entries as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(entries: &[JournalEntry], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for e in entries {
        wtr.write_record(&[
            e.seq.to_string(),
            e.method.clone(),
            e.uri.clone(),
            e.handler.to_string(),
            e.status.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
