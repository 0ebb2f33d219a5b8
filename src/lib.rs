//! Rebuilds per-device GPS trips from a batch of raw fixes and exports them
//! as GeoJSON line features.

pub mod config;
pub mod export;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod trips;
pub mod validate;
