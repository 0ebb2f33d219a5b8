//! Drives ingest → sort → segment → measure → export.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::export::FeatureCollection;
use crate::ingest::{RawRecord, RejectSink, ingest_rows};
use crate::output::{RejectLog, write_document, write_json};
use crate::parser::read_rows;
use crate::stats::RunStats;
use crate::trips::segment::{keep_trips, split_buffers};
use crate::trips::{DeviceTracks, SplitRule, TripMetrics};

/// Result of one run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub collection: FeatureCollection,
    pub stats: RunStats,
}

/// Segments every (already sorted) track and collects the kept trips.
///
/// Devices are visited in first-seen order, trips in closing order, which
/// fixes both feature order and colour assignment.
pub fn build_collection(
    tracks: &DeviceTracks,
    rule: &SplitRule,
    stats: &mut RunStats,
) -> FeatureCollection {
    let mut collection = FeatureCollection::new();

    for track in tracks.iter() {
        let buffers = split_buffers(&track.fixes, rule);
        let trips = keep_trips(&track.device_id, &buffers);

        stats.segments += buffers.len();
        stats.dropped_single_fix_segments += buffers.len() - trips.len();
        debug!(
            device_id = %track.device_id,
            fixes = track.fixes.len(),
            segments = buffers.len(),
            trips = trips.len(),
            "Device segmented"
        );

        for trip in &trips {
            let metrics = TripMetrics::from_fixes(trip.fixes);
            collection.push_trip(trip, &metrics);
        }
    }

    stats.trips_exported = collection.len();
    collection
}

/// Runs the whole pipeline over in-memory rows. Rejects go to `sink`.
pub fn run<I, S>(rows: I, rule: &SplitRule, sink: &mut S) -> Result<PipelineOutput>
where
    I: IntoIterator<Item = RawRecord>,
    S: RejectSink + ?Sized,
{
    let mut stats = RunStats::default();

    let mut tracks = ingest_rows(rows, sink, &mut stats)?;
    tracks.sort_chronologically();

    let collection = build_collection(&tracks, rule, &mut stats);

    Ok(PipelineOutput { collection, stats })
}

/// File-backed run: reads the input, writes the reject log, the trip
/// document and (optionally) the statistics.
///
/// Nothing is written to the document path unless the whole run succeeds.
#[tracing::instrument(skip(config), fields(input = %config.input.display()))]
pub fn run_files(config: &RunConfig) -> Result<RunStats> {
    let rows = read_rows(&config.input)?;

    let mut reject_log = RejectLog::create(&config.rejects)?;
    let output = run(rows, &config.rule, &mut reject_log)?;
    let rejects_written = reject_log.finish()?;

    write_document(&config.output, &output.collection)?;

    if let Some(stats_path) = &config.stats {
        write_json(stats_path, &output.stats)?;
    }

    let stats = output.stats;
    info!(
        rows = stats.rows_read,
        fixes = stats.fixes,
        devices = stats.devices,
        rejects = rejects_written,
        trips = stats.trips_exported,
        dropped_segments = stats.dropped_single_fix_segments,
        acceptance_pct = stats.acceptance_pct(),
        "Run complete"
    );

    Ok(stats)
}
