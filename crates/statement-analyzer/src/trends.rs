use ratio_engine::catalog::{CURRENT_RATIO, DEBT_RATIO, NET_MARGIN, RETURN_ON_EQUITY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::batch::StatementAnalysis;

/// Key ratios charted across periods.
pub const DEFAULT_TREND_RATIOS: &[&str] =
    &[CURRENT_RATIO, NET_MARGIN, RETURN_ON_EQUITY, DEBT_RATIO];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub value: Decimal,
}

/// One ratio for one company, period by period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioTrend {
    pub company: String,
    pub ratio: String,
    pub points: Vec<TrendPoint>,
}

impl RatioTrend {
    /// Difference between the last two points.
    pub fn latest_change(&self) -> Option<Decimal> {
        match self.points.as_slice() {
            [.., prev, last] => last.value.checked_sub(prev.value),
            _ => None,
        }
    }
}

/// Series per (company, ratio). `analyses` must already be sorted by
/// company and period; series follow that order.
pub fn ratio_trends(analyses: &[StatementAnalysis], ratios: &[&str]) -> Vec<RatioTrend> {
    let mut trends = Vec::new();
    for company in analyses.chunk_by(|a, b| a.company == b.company) {
        let Some(first) = company.first() else {
            continue;
        };
        for ratio in ratios {
            let points: Vec<TrendPoint> = company
                .iter()
                .filter_map(|a| {
                    a.report.ratios.get(ratio).map(|value| TrendPoint {
                        period: a.period.clone(),
                        value,
                    })
                })
                .collect();
            if points.is_empty() {
                continue;
            }
            trends.push(RatioTrend {
                company: first.company.clone(),
                ratio: ratio.to_string(),
                points,
            });
        }
    }
    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StatementReport;
    use rust_decimal_macros::dec;
    use statement_core::{RatioCategory, RatioMap};

    fn analysis(company: &str, period: &str, current: Decimal) -> StatementAnalysis {
        let mut ratios = RatioMap::new();
        ratios.insert(CURRENT_RATIO, RatioCategory::Liquidity, current);
        StatementAnalysis {
            company: company.to_string(),
            period: period.to_string(),
            report: StatementReport {
                ratios,
                ..StatementReport::default()
            },
        }
    }

    #[test]
    fn test_series_per_company() {
        let analyses = vec![
            analysis("alpha", "1401", dec!(1.2)),
            analysis("alpha", "1402", dec!(1.5)),
            analysis("beta", "1402", dec!(0.9)),
        ];
        let trends = ratio_trends(&analyses, &[CURRENT_RATIO, NET_MARGIN]);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].company, "alpha");
        assert_eq!(trends[0].points.len(), 2);
        assert_eq!(trends[0].latest_change(), Some(dec!(0.3)));
        assert_eq!(trends[1].company, "beta");
        assert_eq!(trends[1].latest_change(), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(ratio_trends(&[], DEFAULT_TREND_RATIOS).is_empty());
    }
}
