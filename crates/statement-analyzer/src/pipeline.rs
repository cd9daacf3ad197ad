use metric_extraction::MetricExtractor;
use ratio_engine::RatioEngine;
use serde::{Deserialize, Serialize};
use statement_core::{CanonicalMetric, Grid, MetricMap, MetricResolver, RatioCalculator, RatioMap};

/// Metrics and ratios for one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementReport {
    pub metrics: MetricMap,
    pub ratios: RatioMap,
    /// Metrics no sheet yielded a value for.
    pub unresolved: Vec<CanonicalMetric>,
    /// Metrics synthesized from others before the ratios were computed.
    pub derived: Vec<CanonicalMetric>,
    /// Ratios that fell back to zero on a guarded division.
    pub guarded: Vec<String>,
}

/// Grid sheets in, metric and ratio maps out.
pub struct StatementPipeline<R = MetricExtractor, C = RatioEngine> {
    resolver: R,
    calculator: C,
}

impl<R: MetricResolver, C: RatioCalculator> StatementPipeline<R, C> {
    pub fn new(resolver: R, calculator: C) -> Self {
        Self {
            resolver,
            calculator,
        }
    }

    pub fn analyze(&self, sheets: &[Grid]) -> StatementReport {
        let extraction = self.resolver.resolve(sheets);
        let ratios = self.calculator.calculate(&extraction.metrics);

        StatementReport {
            // The calculator's map carries any derived metrics
            metrics: ratios.metrics,
            ratios: ratios.ratios,
            unresolved: extraction.unresolved,
            derived: ratios.derived,
            guarded: ratios.guarded,
        }
    }

    pub fn analyze_grid(&self, grid: &Grid) -> StatementReport {
        self.analyze(std::slice::from_ref(grid))
    }
}

impl StatementPipeline {
    /// Built-in Persian aliases and the standard ratio catalog.
    pub fn standard() -> Self {
        Self::new(MetricExtractor::default(), RatioEngine::default())
    }
}

impl Default for StatementPipeline {
    fn default() -> Self {
        Self::standard()
    }
}
