use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statement_core::stats;
use statement_core::Candidate;

/// Tukey outlier fence over distinct candidate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IqrFence {
    pub multiplier: Decimal,
    /// Fewer distinct values than this pass through unfiltered.
    pub min_distinct: usize,
}

impl Default for IqrFence {
    fn default() -> Self {
        Self {
            multiplier: dec!(1.5),
            min_distinct: 5,
        }
    }
}

impl IqrFence {
    /// Splits ascending `sorted` into (kept, dropped).
    pub fn apply(&self, sorted: &[Decimal]) -> (Vec<Decimal>, Vec<Decimal>) {
        if sorted.len() < self.min_distinct {
            return (sorted.to_vec(), Vec::new());
        }
        match stats::iqr_fence(sorted, self.multiplier) {
            Some((lower, upper)) => sorted.iter().partition(|v| **v >= lower && **v <= upper),
            None => (sorted.to_vec(), Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    Maximum,
    Median,
}

/// Picks the maximum of a tight cluster and the median of a spread-out one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispersionSwitch {
    /// `max / min` above which the median is used.
    pub threshold: Decimal,
}

impl Default for DispersionSwitch {
    fn default() -> Self {
        Self {
            threshold: dec!(100),
        }
    }
}

impl DispersionSwitch {
    pub fn choose(&self, sorted: &[Decimal]) -> Option<(Decimal, SelectionRule)> {
        let spread = stats::dispersion(sorted)?;
        if spread > self.threshold {
            stats::upper_median(sorted).map(|v| (v, SelectionRule::Median))
        } else {
            sorted.last().map(|v| (*v, SelectionRule::Maximum))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub outlier_filter: IqrFence,
    pub dispersion: DispersionSwitch,
}

/// Outcome of resolving one metric's candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub value: Decimal,
    /// Closest candidate carrying the selected value.
    pub candidate: Candidate,
    pub rule: SelectionRule,
    /// Distinct positive values before outlier filtering.
    pub distinct: usize,
    pub outliers: Vec<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateSelector {
    config: SelectorConfig,
}

impl CandidateSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Selected value, or zero when there is nothing to choose from.
    pub fn select(&self, candidates: &[Candidate]) -> Decimal {
        self.resolve(candidates)
            .map(|s| s.value)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn resolve(&self, candidates: &[Candidate]) -> Option<Selection> {
        let representatives = closest_by_value(candidates);
        let distinct: Vec<Decimal> = representatives.keys().copied().collect();

        let (kept, outliers) = self.config.outlier_filter.apply(&distinct);
        if !outliers.is_empty() {
            tracing::debug!("Dropped {} outlier candidates: {:?}", outliers.len(), outliers);
        }

        let (value, rule) = self.config.dispersion.choose(&kept)?;
        let candidate = Candidate::clone(representatives.get(&value)?);
        if distinct.len() > 1 {
            tracing::debug!(
                "Chose {} by {:?} among {} distinct values",
                value,
                rule,
                distinct.len()
            );
        }

        Some(Selection {
            value,
            candidate,
            rule,
            distinct: distinct.len(),
            outliers,
        })
    }
}

/// One candidate per distinct positive value: the smallest distance, the
/// earliest collected on ties. Keys come out ascending.
fn closest_by_value(candidates: &[Candidate]) -> BTreeMap<Decimal, &Candidate> {
    let mut by_value: BTreeMap<Decimal, &Candidate> = BTreeMap::new();
    for candidate in candidates.iter().filter(|c| c.value > Decimal::ZERO) {
        by_value
            .entry(candidate.value)
            .and_modify(|best| {
                if candidate.distance < best.distance {
                    *best = candidate;
                }
            })
            .or_insert(candidate);
    }
    by_value
}
