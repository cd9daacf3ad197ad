use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statement_core::ExtractionError;

use crate::collector::{CollectorConfig, MAX_NEIGHBOR_RADIUS};
use crate::number::ParserConfig;
use crate::selector::SelectorConfig;

/// Tunables for the whole extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub parser: ParserConfig,
    pub collector: CollectorConfig,
    pub selector: SelectorConfig,
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), ExtractionError> {
        let invalid = |msg: String| Err(ExtractionError::InvalidConfig(msg));

        let parser = &self.parser;
        if parser.min_magnitude < Decimal::ZERO || parser.min_magnitude >= parser.max_magnitude {
            return invalid(format!(
                "magnitude band [{}, {}] is empty",
                parser.min_magnitude, parser.max_magnitude
            ));
        }
        if self.collector.max_cells_per_metric == 0 {
            return invalid("max_cells_per_metric must be positive".to_string());
        }
        if self.collector.neighbor_radius > MAX_NEIGHBOR_RADIUS {
            return invalid(format!(
                "neighbor_radius {} is above {MAX_NEIGHBOR_RADIUS}",
                self.collector.neighbor_radius
            ));
        }

        let fence = &self.selector.outlier_filter;
        if fence.multiplier <= Decimal::ZERO {
            return invalid(format!("IQR multiplier {} must be positive", fence.multiplier));
        }
        if fence.min_distinct < 2 {
            return invalid(format!("IQR min_distinct {} is below 2", fence.min_distinct));
        }
        if self.selector.dispersion.threshold < Decimal::ONE {
            return invalid(format!(
                "dispersion threshold {} is below 1",
                self.selector.dispersion.threshold
            ));
        }
        Ok(())
    }
}
