use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ExtractionError;

/// Financial line items resolved from every statement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalMetric {
    CurrentAssets,
    TotalAssets,
    CurrentLiabilities,
    TotalLiabilities,
    Sales,
    GrossProfit,
    OperatingProfit,
    NetProfit,
    Inventory,
    Receivables,
    Equity,
    CostOfGoodsSold,
    Cash,
}

impl CanonicalMetric {
    pub const COUNT: usize = 13;

    /// Every metric in declaration order. `ALL[m.index()] == m`.
    pub const ALL: [CanonicalMetric; CanonicalMetric::COUNT] = [
        CanonicalMetric::CurrentAssets,
        CanonicalMetric::TotalAssets,
        CanonicalMetric::CurrentLiabilities,
        CanonicalMetric::TotalLiabilities,
        CanonicalMetric::Sales,
        CanonicalMetric::GrossProfit,
        CanonicalMetric::OperatingProfit,
        CanonicalMetric::NetProfit,
        CanonicalMetric::Inventory,
        CanonicalMetric::Receivables,
        CanonicalMetric::Equity,
        CanonicalMetric::CostOfGoodsSold,
        CanonicalMetric::Cash,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable snake_case key, identical to the serde representation.
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalMetric::CurrentAssets => "current_assets",
            CanonicalMetric::TotalAssets => "total_assets",
            CanonicalMetric::CurrentLiabilities => "current_liabilities",
            CanonicalMetric::TotalLiabilities => "total_liabilities",
            CanonicalMetric::Sales => "sales",
            CanonicalMetric::GrossProfit => "gross_profit",
            CanonicalMetric::OperatingProfit => "operating_profit",
            CanonicalMetric::NetProfit => "net_profit",
            CanonicalMetric::Inventory => "inventory",
            CanonicalMetric::Receivables => "receivables",
            CanonicalMetric::Equity => "equity",
            CanonicalMetric::CostOfGoodsSold => "cost_of_goods_sold",
            CanonicalMetric::Cash => "cash",
        }
    }

    /// Human-readable label for the metric
    pub fn to_label(&self) -> &'static str {
        match self {
            CanonicalMetric::CurrentAssets => "Current Assets",
            CanonicalMetric::TotalAssets => "Total Assets",
            CanonicalMetric::CurrentLiabilities => "Current Liabilities",
            CanonicalMetric::TotalLiabilities => "Total Liabilities",
            CanonicalMetric::Sales => "Sales",
            CanonicalMetric::GrossProfit => "Gross Profit",
            CanonicalMetric::OperatingProfit => "Operating Profit",
            CanonicalMetric::NetProfit => "Net Profit",
            CanonicalMetric::Inventory => "Inventory",
            CanonicalMetric::Receivables => "Receivables",
            CanonicalMetric::Equity => "Equity",
            CanonicalMetric::CostOfGoodsSold => "Cost of Goods Sold",
            CanonicalMetric::Cash => "Cash",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.key() == key)
    }
}

impl std::fmt::Display for CanonicalMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_label())
    }
}

/// A numeric value found near a label match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub value: Decimal,
    /// Column offset from the label cell (row offset for transposed scans).
    pub distance: usize,
    pub row: usize,
    pub col: usize,
    pub matched_alias: String,
}

/// Resolved value per canonical metric. Missing metrics read as zero.
///
/// Backed by a fixed array indexed by [`CanonicalMetric::index`], so every
/// metric always has a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<CanonicalMetric, Decimal>",
    from = "BTreeMap<CanonicalMetric, Decimal>"
)]
pub struct MetricMap {
    values: [Decimal; CanonicalMetric::COUNT],
}

impl MetricMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: CanonicalMetric) -> Decimal {
        self.values[metric.index()]
    }

    /// Returns a copy with `metric` replaced; the receiver is left untouched.
    pub fn with(mut self, metric: CanonicalMetric, value: Decimal) -> Self {
        self.values[metric.index()] = value;
        self
    }

    pub fn is_resolved(&self, metric: CanonicalMetric) -> bool {
        !self.get(metric).is_zero()
    }

    pub fn unresolved(&self) -> Vec<CanonicalMetric> {
        CanonicalMetric::ALL
            .iter()
            .copied()
            .filter(|m| !self.is_resolved(*m))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalMetric, Decimal)> + '_ {
        CanonicalMetric::ALL
            .iter()
            .map(move |m| (*m, self.values[m.index()]))
    }
}

impl FromIterator<(CanonicalMetric, Decimal)> for MetricMap {
    fn from_iter<I: IntoIterator<Item = (CanonicalMetric, Decimal)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MetricMap::new(), |map, (metric, value)| map.with(metric, value))
    }
}

impl From<BTreeMap<CanonicalMetric, Decimal>> for MetricMap {
    fn from(map: BTreeMap<CanonicalMetric, Decimal>) -> Self {
        map.into_iter().collect()
    }
}

impl From<MetricMap> for BTreeMap<CanonicalMetric, Decimal> {
    fn from(map: MetricMap) -> Self {
        map.iter().collect()
    }
}

/// Ratio grouping used by the catalog and by downstream report sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioCategory {
    Liquidity,
    Profitability,
    Leverage,
    Activity,
}

impl std::fmt::Display for RatioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatioCategory::Liquidity => write!(f, "Liquidity"),
            RatioCategory::Profitability => write!(f, "Profitability"),
            RatioCategory::Leverage => write!(f, "Leverage"),
            RatioCategory::Activity => write!(f, "Activity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioValue {
    pub name: String,
    pub category: RatioCategory,
    pub value: Decimal,
}

/// Computed ratios in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioMap {
    entries: Vec<RatioValue>,
}

impl RatioMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a ratio, replacing an earlier entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, category: RatioCategory, value: Decimal) {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                existing.category = category;
                existing.value = value;
            }
            None => self.entries.push(RatioValue {
                name,
                category,
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatioValue> {
        self.entries.iter()
    }

    pub fn by_category(&self, category: RatioCategory) -> impl Iterator<Item = &RatioValue> {
        self.entries.iter().filter(move |e| e.category == category)
    }
}

/// Metrics resolved from one statement plus the conditions met on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub metrics: MetricMap,
    pub unresolved: Vec<CanonicalMetric>,
    #[serde(skip)]
    pub issues: Vec<ExtractionError>,
}

/// Ratios computed from a metric map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioOutcome {
    pub ratios: RatioMap,
    /// Metric map after derivations; this is what the ratios were computed from.
    pub metrics: MetricMap,
    pub derived: Vec<CanonicalMetric>,
    /// Names of ratios whose denominator tripped the division guard.
    pub guarded: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metric_index_matches_all() {
        for (i, metric) in CanonicalMetric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
            assert_eq!(CanonicalMetric::from_key(metric.key()), Some(*metric));
        }
    }

    #[test]
    fn test_metric_map_defaults_to_zero() {
        let map = MetricMap::new();
        assert_eq!(map.get(CanonicalMetric::Sales), Decimal::ZERO);
        assert_eq!(map.unresolved().len(), CanonicalMetric::COUNT);
    }

    #[test]
    fn test_metric_map_with_leaves_original() {
        let base = MetricMap::new();
        let updated = base.clone().with(CanonicalMetric::Cash, dec!(42));
        assert_eq!(base.get(CanonicalMetric::Cash), Decimal::ZERO);
        assert_eq!(updated.get(CanonicalMetric::Cash), dec!(42));
        assert!(updated.is_resolved(CanonicalMetric::Cash));
    }

    #[test]
    fn test_metric_map_serializes_with_snake_case_keys() {
        let map = MetricMap::new().with(CanonicalMetric::CurrentAssets, dec!(1500000));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["current_assets"], serde_json::json!("1500000"));
        assert_eq!(json["cash"], serde_json::json!("0"));

        let back: MetricMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_ratio_map_keeps_insertion_order() {
        let mut ratios = RatioMap::new();
        ratios.insert("b", RatioCategory::Leverage, dec!(2));
        ratios.insert("a", RatioCategory::Liquidity, dec!(1));
        ratios.insert("b", RatioCategory::Leverage, dec!(3));

        let names: Vec<&str> = ratios.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(ratios.get("b"), Some(dec!(3)));
        assert_eq!(ratios.get("missing"), None);
        assert_eq!(ratios.by_category(RatioCategory::Liquidity).count(), 1);
    }
}
