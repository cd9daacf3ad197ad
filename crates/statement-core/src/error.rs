use thiserror::Error;

use crate::CanonicalMetric;

/// Conditions raised while turning a grid into metrics and ratios.
///
/// None of these cross the public extraction/ratio boundary as failures:
/// they are collected into outcomes and logs while the affected value
/// degrades to zero.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Unparseable cell at ({row}, {col}): {reason}")]
    UnparseableCell {
        row: usize,
        col: usize,
        reason: String,
    },

    #[error("Metric not found: {0}")]
    MetricNotFound(CanonicalMetric),

    #[error("Ambiguous candidates for {metric}: {distinct} distinct values")]
    AmbiguousCandidates {
        metric: CanonicalMetric,
        distinct: usize,
    },

    #[error("Division guard triggered for {0}")]
    DivisionGuardTriggered(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
