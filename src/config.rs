use std::path::PathBuf;

use crate::trips::SplitRule;

/// Everything one file-backed run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rejects: PathBuf,
    /// Optional destination for the run statistics as JSON.
    pub stats: Option<PathBuf>,
    pub rule: SplitRule,
}

/// Parses a split threshold from the command line. Thresholds must be
/// finite and not negative, since a NaN threshold would never split.
pub fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(format!("'{value}' must be a finite number >= 0"));
    }
    Ok(threshold)
}

impl RunConfig {
    /// Config with default output paths and thresholds for `input`.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from("trips.geojson"),
            rejects: PathBuf::from("rejects.csv"),
            stats: None,
            rule: SplitRule::default(),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_rejects(mut self, rejects: impl Into<PathBuf>) -> Self {
        self.rejects = rejects.into();
        self
    }

    pub fn with_stats(mut self, stats: Option<PathBuf>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_rule(mut self, rule: SplitRule) -> Self {
        self.rule = rule;
        self
    }
}
