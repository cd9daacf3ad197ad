use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statement_core::{
    CanonicalMetric, ExtractionError, MetricMap, RatioCalculator, RatioMap, RatioOutcome,
};

use crate::catalog::{RatioCatalog, RatioDefinition};
use crate::safe_div::{try_divide, DivisionGuard, DEFAULT_EPSILON, DEFAULT_PRECISION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioConfig {
    /// Fractional digits kept on each ratio.
    pub precision: u32,
    pub epsilon: Decimal,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl RatioConfig {
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.precision > 28 {
            return Err(ExtractionError::InvalidConfig(format!(
                "ratio precision {} is above 28",
                self.precision
            )));
        }
        if self.epsilon < Decimal::ZERO {
            return Err(ExtractionError::InvalidConfig(format!(
                "division epsilon {} is negative",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// `Sales - GrossProfit` when COGS is missing and both inputs are positive.
/// `None` if COGS is already known or the difference is not positive.
pub fn derive_cost_of_goods_sold(metrics: &MetricMap) -> Option<Decimal> {
    let cogs = metrics.get(CanonicalMetric::CostOfGoodsSold);
    let sales = metrics.get(CanonicalMetric::Sales);
    let gross_profit = metrics.get(CanonicalMetric::GrossProfit);

    if !cogs.is_zero() || sales <= Decimal::ZERO || gross_profit <= Decimal::ZERO {
        return None;
    }
    let derived = sales.checked_sub(gross_profit)?;
    (derived > Decimal::ZERO).then_some(derived)
}

/// Computes a ratio catalog from resolved metrics.
#[derive(Debug, Clone, Default)]
pub struct RatioEngine {
    catalog: RatioCatalog,
    config: RatioConfig,
}

impl RatioEngine {
    pub fn new(catalog: RatioCatalog, config: RatioConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &RatioCatalog {
        &self.catalog
    }

    /// Every catalog ratio, in catalog order. Guarded ratios are zero.
    pub fn compute_all(&self, metrics: &MetricMap) -> RatioMap {
        self.compute_detailed(metrics).ratios
    }

    pub fn compute_detailed(&self, metrics: &MetricMap) -> RatioOutcome {
        let mut derived = Vec::new();
        let metrics = match derive_cost_of_goods_sold(metrics) {
            Some(cogs) => {
                tracing::debug!("Derived cost_of_goods_sold = {} from sales - gross_profit", cogs);
                derived.push(CanonicalMetric::CostOfGoodsSold);
                metrics.clone().with(CanonicalMetric::CostOfGoodsSold, cogs)
            }
            None => metrics.clone(),
        };

        let mut ratios = RatioMap::new();
        let mut guarded = Vec::new();
        for def in self.catalog.iter() {
            let value = match self.evaluate(def, &metrics) {
                Ok(value) => value,
                Err(guard) => {
                    tracing::debug!("{}: {}", def.name, guard);
                    guarded.push(def.name.clone());
                    Decimal::ZERO
                }
            };
            ratios.insert(def.name.clone(), def.category, value);
        }

        for name in &guarded {
            tracing::warn!("{}", ExtractionError::DivisionGuardTriggered(name.clone()));
        }

        RatioOutcome {
            ratios,
            metrics,
            derived,
            guarded,
        }
    }

    /// One ratio with its guard reason instead of a silent zero.
    pub fn evaluate(
        &self,
        def: &RatioDefinition,
        metrics: &MetricMap,
    ) -> Result<Decimal, DivisionGuard> {
        let numerator = def
            .formula
            .numerator
            .evaluate(metrics)
            .ok_or(DivisionGuard::Overflow)?;
        let denominator = def
            .formula
            .denominator
            .evaluate(metrics)
            .ok_or(DivisionGuard::Overflow)?;
        try_divide(
            numerator,
            denominator,
            def.formula.scale,
            self.config.precision,
            self.config.epsilon,
        )
    }
}

impl RatioCalculator for RatioEngine {
    fn calculate(&self, metrics: &MetricMap) -> RatioOutcome {
        self.compute_detailed(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::*;
    use rust_decimal_macros::dec;
    use statement_core::RatioCategory;

    fn sample_metrics() -> MetricMap {
        MetricMap::new()
            .with(CanonicalMetric::CurrentAssets, dec!(1500000))
            .with(CanonicalMetric::CurrentLiabilities, dec!(800000))
            .with(CanonicalMetric::TotalAssets, dec!(4000000))
            .with(CanonicalMetric::TotalLiabilities, dec!(1600000))
            .with(CanonicalMetric::Equity, dec!(2400000))
            .with(CanonicalMetric::Inventory, dec!(300000))
            .with(CanonicalMetric::Receivables, dec!(400000))
            .with(CanonicalMetric::Cash, dec!(250000))
            .with(CanonicalMetric::Sales, dec!(8000000))
            .with(CanonicalMetric::GrossProfit, dec!(3000000))
            .with(CanonicalMetric::OperatingProfit, dec!(1200000))
            .with(CanonicalMetric::NetProfit, dec!(900000))
    }

    #[test]
    fn test_current_ratio() {
        let metrics = MetricMap::new()
            .with(CanonicalMetric::CurrentAssets, dec!(1500000))
            .with(CanonicalMetric::CurrentLiabilities, dec!(800000));
        let ratios = RatioEngine::default().compute_all(&metrics);
        assert_eq!(ratios.get(CURRENT_RATIO), Some(dec!(1.875)));
    }

    #[test]
    fn test_zero_liabilities_guard() {
        let metrics = MetricMap::new().with(CanonicalMetric::CurrentAssets, dec!(1500000));
        let outcome = RatioEngine::default().compute_detailed(&metrics);
        assert_eq!(outcome.ratios.get(CURRENT_RATIO), Some(Decimal::ZERO));
        assert!(outcome.guarded.contains(&CURRENT_RATIO.to_string()));
    }

    #[test]
    fn test_cogs_derivation_feeds_inventory_turnover() {
        let metrics = MetricMap::new()
            .with(CanonicalMetric::Sales, dec!(8000000))
            .with(CanonicalMetric::GrossProfit, dec!(3000000))
            .with(CanonicalMetric::Inventory, dec!(1000000));
        let outcome = RatioEngine::default().compute_detailed(&metrics);
        assert_eq!(outcome.derived, vec![CanonicalMetric::CostOfGoodsSold]);
        assert_eq!(
            outcome.metrics.get(CanonicalMetric::CostOfGoodsSold),
            dec!(5000000)
        );
        assert_eq!(outcome.ratios.get(INVENTORY_TURNOVER), Some(dec!(5)));
        // The input map is untouched
        assert_eq!(metrics.get(CanonicalMetric::CostOfGoodsSold), Decimal::ZERO);
    }

    #[test]
    fn test_cogs_derivation_conditions() {
        let base = MetricMap::new()
            .with(CanonicalMetric::Sales, dec!(100))
            .with(CanonicalMetric::GrossProfit, dec!(40));
        assert_eq!(derive_cost_of_goods_sold(&base), Some(dec!(60)));

        let known = base.clone().with(CanonicalMetric::CostOfGoodsSold, dec!(70));
        assert_eq!(derive_cost_of_goods_sold(&known), None);

        let no_margin = base.clone().with(CanonicalMetric::GrossProfit, dec!(100));
        assert_eq!(derive_cost_of_goods_sold(&no_margin), None);

        let no_sales = base.with(CanonicalMetric::Sales, Decimal::ZERO);
        assert_eq!(derive_cost_of_goods_sold(&no_sales), None);
    }

    #[test]
    fn test_full_catalog_values() {
        let ratios = RatioEngine::default().compute_all(&sample_metrics());
        assert_eq!(ratios.len(), 13);
        assert_eq!(ratios.get(QUICK_RATIO), Some(dec!(1.5)));
        assert_eq!(ratios.get(CASH_RATIO), Some(dec!(0.3125)));
        assert_eq!(ratios.get(GROSS_MARGIN), Some(dec!(37.5)));
        assert_eq!(ratios.get(OPERATING_MARGIN), Some(dec!(15)));
        assert_eq!(ratios.get(NET_MARGIN), Some(dec!(11.25)));
        assert_eq!(ratios.get(RETURN_ON_ASSETS), Some(dec!(22.5)));
        assert_eq!(ratios.get(RETURN_ON_EQUITY), Some(dec!(37.5)));
        assert_eq!(ratios.get(DEBT_RATIO), Some(dec!(40)));
        assert_eq!(ratios.get(DEBT_TO_EQUITY), Some(dec!(0.6667)));
        assert_eq!(ratios.get(RECEIVABLE_TURNOVER), Some(dec!(20)));
        assert_eq!(ratios.get(DAYS_SALES_OUTSTANDING), Some(dec!(18.25)));
        // COGS derived as 5,000,000
        assert_eq!(ratios.get(INVENTORY_TURNOVER), Some(dec!(16.6667)));
    }

    #[test]
    fn test_output_follows_catalog_order() {
        let engine = RatioEngine::default();
        let ratios = engine.compute_all(&sample_metrics());
        let names: Vec<&str> = ratios.iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<&str> = engine.catalog().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, expected);
        assert_eq!(ratios.by_category(RatioCategory::Profitability).count(), 5);
    }

    #[test]
    fn test_empty_metrics_give_all_zero() {
        let outcome = RatioEngine::default().compute_detailed(&MetricMap::new());
        assert!(outcome.ratios.iter().all(|r| r.value.is_zero()));
        assert_eq!(outcome.guarded.len(), 13);
        assert!(outcome.derived.is_empty());
    }

    #[test]
    fn test_precision_is_configurable() {
        let engine = RatioEngine::new(
            RatioCatalog::standard(),
            RatioConfig {
                precision: 2,
                ..RatioConfig::default()
            },
        );
        let ratios = engine.compute_all(&sample_metrics());
        assert_eq!(ratios.get(DEBT_TO_EQUITY), Some(dec!(0.67)));
    }

    #[test]
    fn test_overflowing_inputs_are_guarded() {
        let metrics = MetricMap::new()
            .with(CanonicalMetric::Receivables, Decimal::MAX)
            .with(CanonicalMetric::Sales, dec!(1));
        let outcome = RatioEngine::default().compute_detailed(&metrics);
        assert_eq!(outcome.ratios.get(DAYS_SALES_OUTSTANDING), Some(Decimal::ZERO));
        assert!(outcome.guarded.contains(&DAYS_SALES_OUTSTANDING.to_string()));
    }

    #[test]
    fn test_config_validation() {
        assert!(RatioConfig::default().validate().is_ok());
        let bad = RatioConfig {
            precision: 40,
            ..RatioConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
