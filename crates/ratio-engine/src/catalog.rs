use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statement_core::{CanonicalMetric, MetricMap, RatioCategory};
use thiserror::Error;

pub const CURRENT_RATIO: &str = "current_ratio";
pub const QUICK_RATIO: &str = "quick_ratio";
pub const CASH_RATIO: &str = "cash_ratio";
pub const GROSS_MARGIN: &str = "gross_margin";
pub const OPERATING_MARGIN: &str = "operating_margin";
pub const NET_MARGIN: &str = "net_margin";
pub const RETURN_ON_ASSETS: &str = "return_on_assets";
pub const RETURN_ON_EQUITY: &str = "return_on_equity";
pub const DEBT_RATIO: &str = "debt_ratio";
pub const DEBT_TO_EQUITY: &str = "debt_to_equity";
pub const RECEIVABLE_TURNOVER: &str = "receivable_turnover";
pub const DAYS_SALES_OUTSTANDING: &str = "days_sales_outstanding";
pub const INVENTORY_TURNOVER: &str = "inventory_turnover";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Ratio catalog is empty")]
    Empty,

    #[error("Duplicate ratio name: {0}")]
    DuplicateName(String),

    #[error("Ratio {0} has a blank name or zero scale")]
    InvalidDefinition(String),

    #[error("Malformed ratio catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// One side of a ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Metric(CanonicalMetric),
    /// `minuend - subtrahend`
    Difference(CanonicalMetric, CanonicalMetric),
    Scaled(CanonicalMetric, Decimal),
}

impl Term {
    /// `None` on overflow.
    pub fn evaluate(&self, metrics: &MetricMap) -> Option<Decimal> {
        match self {
            Term::Metric(m) => Some(metrics.get(*m)),
            Term::Difference(a, b) => metrics.get(*a).checked_sub(metrics.get(*b)),
            Term::Scaled(m, factor) => metrics.get(*m).checked_mul(*factor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioFormula {
    pub numerator: Term,
    pub denominator: Term,
    #[serde(default = "unit_scale")]
    pub scale: Decimal,
}

fn unit_scale() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioDefinition {
    pub name: String,
    pub category: RatioCategory,
    pub formula: RatioFormula,
}

impl RatioDefinition {
    pub fn new(
        name: impl Into<String>,
        category: RatioCategory,
        numerator: Term,
        denominator: Term,
        scale: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            formula: RatioFormula {
                numerator,
                denominator,
                scale,
            },
        }
    }
}

/// Ordered ratio definitions. Output ratio maps follow this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioCatalog {
    definitions: Vec<RatioDefinition>,
}

impl RatioCatalog {
    /// Validates names and scales.
    pub fn new(definitions: Vec<RatioDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for def in &definitions {
            if def.name.trim().is_empty() || def.formula.scale.is_zero() {
                return Err(CatalogError::InvalidDefinition(def.name.clone()));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(CatalogError::DuplicateName(def.name.clone()));
            }
        }
        Ok(Self { definitions })
    }

    /// The built-in thirteen ratios across the four categories.
    pub fn standard() -> Self {
        use CanonicalMetric::*;
        use RatioCategory::*;

        let hundred = dec!(100);
        let definitions = vec![
            // Liquidity
            RatioDefinition::new(
                CURRENT_RATIO,
                Liquidity,
                Term::Metric(CurrentAssets),
                Term::Metric(CurrentLiabilities),
                Decimal::ONE,
            ),
            RatioDefinition::new(
                QUICK_RATIO,
                Liquidity,
                Term::Difference(CurrentAssets, Inventory),
                Term::Metric(CurrentLiabilities),
                Decimal::ONE,
            ),
            RatioDefinition::new(
                CASH_RATIO,
                Liquidity,
                Term::Metric(Cash),
                Term::Metric(CurrentLiabilities),
                Decimal::ONE,
            ),
            // Profitability, in percent
            RatioDefinition::new(
                GROSS_MARGIN,
                Profitability,
                Term::Metric(GrossProfit),
                Term::Metric(Sales),
                hundred,
            ),
            RatioDefinition::new(
                OPERATING_MARGIN,
                Profitability,
                Term::Metric(OperatingProfit),
                Term::Metric(Sales),
                hundred,
            ),
            RatioDefinition::new(
                NET_MARGIN,
                Profitability,
                Term::Metric(NetProfit),
                Term::Metric(Sales),
                hundred,
            ),
            RatioDefinition::new(
                RETURN_ON_ASSETS,
                Profitability,
                Term::Metric(NetProfit),
                Term::Metric(TotalAssets),
                hundred,
            ),
            RatioDefinition::new(
                RETURN_ON_EQUITY,
                Profitability,
                Term::Metric(NetProfit),
                Term::Metric(Equity),
                hundred,
            ),
            // Leverage
            RatioDefinition::new(
                DEBT_RATIO,
                Leverage,
                Term::Metric(TotalLiabilities),
                Term::Metric(TotalAssets),
                hundred,
            ),
            RatioDefinition::new(
                DEBT_TO_EQUITY,
                Leverage,
                Term::Metric(TotalLiabilities),
                Term::Metric(Equity),
                Decimal::ONE,
            ),
            // Activity
            RatioDefinition::new(
                RECEIVABLE_TURNOVER,
                Activity,
                Term::Metric(Sales),
                Term::Metric(Receivables),
                Decimal::ONE,
            ),
            RatioDefinition::new(
                DAYS_SALES_OUTSTANDING,
                Activity,
                Term::Scaled(Receivables, dec!(365)),
                Term::Metric(Sales),
                Decimal::ONE,
            ),
            RatioDefinition::new(
                INVENTORY_TURNOVER,
                Activity,
                Term::Metric(CostOfGoodsSold),
                Term::Metric(Inventory),
                Decimal::ONE,
            ),
        ];
        Self { definitions }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<RatioDefinition> = serde_json::from_str(json)?;
        Self::new(definitions)
    }

    pub fn get(&self, name: &str) -> Option<&RatioDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatioDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for RatioCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = RatioCatalog::standard();
        assert_eq!(catalog.len(), 13);
        let categories: HashSet<RatioCategory> = catalog.iter().map(|d| d.category).collect();
        assert_eq!(categories.len(), 4);
        assert_eq!(catalog.iter().next().unwrap().name, CURRENT_RATIO);
        assert_eq!(catalog.get(RETURN_ON_EQUITY).unwrap().formula.scale, dec!(100));
    }

    #[test]
    fn test_terms() {
        let metrics = MetricMap::new()
            .with(CanonicalMetric::CurrentAssets, dec!(1000))
            .with(CanonicalMetric::Inventory, dec!(300));
        assert_eq!(
            Term::Difference(CanonicalMetric::CurrentAssets, CanonicalMetric::Inventory)
                .evaluate(&metrics),
            Some(dec!(700))
        );
        assert_eq!(
            Term::Scaled(CanonicalMetric::Inventory, dec!(2)).evaluate(&metrics),
            Some(dec!(600))
        );
        let huge = MetricMap::new().with(CanonicalMetric::Cash, Decimal::MAX);
        assert_eq!(Term::Scaled(CanonicalMetric::Cash, dec!(2)).evaluate(&huge), None);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"[
            {
                "name": "cash_to_assets",
                "category": "liquidity",
                "formula": {
                    "numerator": {"metric": "cash"},
                    "denominator": {"metric": "total_assets"},
                    "scale": 100
                }
            },
            {
                "name": "working_capital_ratio",
                "category": "liquidity",
                "formula": {
                    "numerator": {"difference": ["current_assets", "current_liabilities"]},
                    "denominator": {"metric": "total_assets"}
                }
            }
        ]"#;
        let catalog = RatioCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("cash_to_assets").unwrap().formula.scale, dec!(100));
        assert_eq!(catalog.get("working_capital_ratio").unwrap().formula.scale, Decimal::ONE);
    }

    #[test]
    fn test_standard_catalog_round_trips_through_json() {
        let json = serde_json::to_string(&RatioCatalog::standard()).unwrap();
        assert_eq!(RatioCatalog::from_json(&json).unwrap(), RatioCatalog::standard());
    }

    #[test]
    fn test_invalid_catalogs() {
        assert!(matches!(RatioCatalog::new(vec![]), Err(CatalogError::Empty)));

        let dup = RatioCatalog::standard().iter().next().unwrap().clone();
        assert!(matches!(
            RatioCatalog::new(vec![dup.clone(), dup]),
            Err(CatalogError::DuplicateName(_))
        ));

        let zero = RatioDefinition::new(
            "zero",
            RatioCategory::Leverage,
            Term::Metric(CanonicalMetric::Cash),
            Term::Metric(CanonicalMetric::Equity),
            Decimal::ZERO,
        );
        assert!(matches!(
            RatioCatalog::new(vec![zero]),
            Err(CatalogError::InvalidDefinition(_))
        ));

        assert!(matches!(RatioCatalog::from_json("{"), Err(CatalogError::Json(_))));
    }
}
