//! Output artifacts: the reject log, the GeoJSON document and run statistics.

use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::export::FeatureCollection;
use crate::ingest::{RejectRecord, RejectSink};

/// Header line of the reject log.
pub const REJECT_LOG_HEADER: [&str; 2] = ["reason", "line"];

/// CSV-backed reject log. The header is written on creation, so an empty
/// run still produces a valid file.
pub struct RejectLog {
    writer: Writer<File>,
    written: usize,
}

impl RejectLog {
    /// Creates (or truncates) the log at `path` and writes its header.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to open reject log '{}'", path.display()))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(REJECT_LOG_HEADER)
            .with_context(|| format!("failed to write reject log '{}'", path.display()))?;

        debug!(path = %path.display(), "Reject log created");
        Ok(Self { writer, written: 0 })
    }

    /// Number of rejects written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

impl RejectSink for RejectLog {
    fn report(&mut self, reject: RejectRecord) -> Result<()> {
        self.writer
            .write_record([reject.reason.as_str(), reject.line.as_str()])?;
        self.written += 1;
        Ok(())
    }
}

/// Serializes `value` as pretty JSON and writes it to `path`.
///
/// Serialization happens fully in memory before the file is touched, so a
/// serialization failure leaves no partial file behind.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize '{}'", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

/// Writes the trip document to `path`.
pub fn write_document(path: &Path, collection: &FeatureCollection) -> Result<()> {
    write_json(path, collection)?;
    info!(path = %path.display(), features = collection.len(), "Trip document written");
    Ok(())
}
