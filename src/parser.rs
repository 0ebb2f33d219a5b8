//! Comma-separated input reader.
//!
//! Rows are returned as plain field lists with no header handling and no
//! length check; both are left to the ingester.

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::ingest::RawRecord;

/// Splits `input` on newlines, except newlines inside a quoted field. A
/// final line terminator does not open another line.
fn split_lines(input: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, &byte) in input.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                lines.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < input.len() {
        lines.push(&input[start..]);
    }

    lines
}

/// Parses one physical line into its fields. A blank line has none.
fn parse_line(line: &[u8], record: &mut ByteRecord) -> Result<RawRecord> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return Ok(RawRecord::new());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    if !rdr.read_byte_record(record)? {
        return Ok(RawRecord::new());
    }

    Ok(record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect())
}

/// Reads every row from `reader`, one entry per line. Rows may differ in
/// length, and quoted fields (including ones spanning lines) are unquoted.
///
/// Blank lines come back as empty rows so the ingester still sees them.
/// Bytes that are not valid UTF-8 are replaced with U+FFFD, which leaves
/// the row for the ingester to reject.
///
/// # Errors
///
/// Returns an error only on an I/O failure.
pub fn parse_rows<R: Read>(mut reader: R) -> Result<Vec<RawRecord>> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut record = ByteRecord::new();
    split_lines(&input)
        .into_iter()
        .map(|line| parse_line(line, &mut record))
        .collect()
}

/// Opens `path` and reads all rows with [`parse_rows`].
pub fn read_rows(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input file '{}'", path.display()))?;
    let rows = parse_rows(file)
        .with_context(|| format!("failed to read input file '{}'", path.display()))?;

    debug!(path = %path.display(), rows = rows.len(), "Input rows read");
    Ok(rows)
}
