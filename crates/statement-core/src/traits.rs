use crate::{ExtractionOutcome, Grid, MetricMap, RatioOutcome};

/// Trait for engines that turn statement sheets into canonical metrics
pub trait MetricResolver: Send + Sync {
    /// Resolves every canonical metric from the sheets of one statement.
    /// Sheets are consulted in order; never fails on malformed content.
    fn resolve(&self, sheets: &[Grid]) -> ExtractionOutcome;
}

/// Trait for engines that compute ratios from resolved metrics
pub trait RatioCalculator: Send + Sync {
    fn calculate(&self, metrics: &MetricMap) -> RatioOutcome;
}
