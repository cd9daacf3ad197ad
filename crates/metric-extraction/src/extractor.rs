use statement_core::{
    CanonicalMetric, ExtractionError, ExtractionOutcome, Grid, MetricMap, MetricResolver,
};

use crate::aliases::AliasCatalog;
use crate::collector::{CandidateCollector, ScanView};
use crate::config::ExtractionConfig;
use crate::number::NumberParser;
use crate::selector::{CandidateSelector, Selection};

/// Resolves all canonical metrics from statement sheets.
#[derive(Debug, Clone, Default)]
pub struct MetricExtractor {
    catalog: AliasCatalog,
    collector: CandidateCollector,
    selector: CandidateSelector,
}

impl MetricExtractor {
    pub fn new(catalog: AliasCatalog, config: ExtractionConfig) -> Self {
        Self {
            catalog,
            collector: CandidateCollector::new(NumberParser::new(config.parser), config.collector),
            selector: CandidateSelector::new(config.selector),
        }
    }

    pub fn catalog(&self) -> &AliasCatalog {
        &self.catalog
    }

    /// Metric map for a single grid; unresolved metrics are zero.
    pub fn extract(&self, grid: &Grid) -> MetricMap {
        self.extract_sheets(std::slice::from_ref(grid)).metrics
    }

    /// Resolves every metric, consulting sheets in order. A metric keeps the
    /// value from the first sheet that yields one.
    pub fn extract_sheets(&self, sheets: &[Grid]) -> ExtractionOutcome {
        let mut metrics = MetricMap::new();
        let mut issues = Vec::new();
        let mut pending: Vec<CanonicalMetric> = CanonicalMetric::ALL.to_vec();

        for (index, sheet) in sheets.iter().enumerate() {
            if pending.is_empty() {
                break;
            }
            if sheet.is_blank() {
                tracing::debug!("Sheet {} is blank, skipping", index);
                continue;
            }

            let view = ScanView::new(sheet);
            pending.retain(|metric| match self.select_in(&view, *metric) {
                Some(selection) => {
                    if selection.distinct > 1 {
                        issues.push(ExtractionError::AmbiguousCandidates {
                            metric: *metric,
                            distinct: selection.distinct,
                        });
                    }
                    tracing::debug!(
                        "{} = {} from sheet {} at ({}, {}) via {:?}",
                        metric.key(),
                        selection.value,
                        index,
                        selection.candidate.row,
                        selection.candidate.col,
                        selection.candidate.matched_alias
                    );
                    metrics = std::mem::take(&mut metrics).with(*metric, selection.value);
                    false
                }
                None => true,
            });
        }

        if !pending.is_empty() {
            let keys: Vec<&str> = pending.iter().map(|m| m.key()).collect();
            tracing::warn!("Unresolved metrics: {}", keys.join(", "));
            issues.extend(pending.iter().map(|m| ExtractionError::MetricNotFound(*m)));
        }

        ExtractionOutcome {
            metrics,
            unresolved: pending,
            issues,
        }
    }

    /// Full selection detail for one metric on one grid.
    pub fn explain(&self, grid: &Grid, metric: CanonicalMetric) -> Option<Selection> {
        self.select_in(&ScanView::new(grid), metric)
    }

    fn select_in(&self, view: &ScanView<'_>, metric: CanonicalMetric) -> Option<Selection> {
        let candidates = self
            .collector
            .collect_in(view, metric, self.catalog.aliases(metric));
        self.selector.resolve(&candidates)
    }
}

impl MetricResolver for MetricExtractor {
    fn resolve(&self, sheets: &[Grid]) -> ExtractionOutcome {
        self.extract_sheets(sheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::SelectionRule;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn balance_sheet() -> Grid {
        Grid::from_text_rows(vec![
            vec!["ترازنامه", "", "۱۴۰۲/۱۲/۲۹", ""],
            vec!["موجودی نقد", "", "250,000", ""],
            vec!["حسابهای دریافتنی تجاری", "", "400,000", ""],
            vec!["موجودي مواد و كالا", "", "300,000", ""],
            vec!["جمع دارایی‌های جاری", "", "1,500,000", ""],
            vec!["جمع کل دارایی‌ها", "", "4,000,000", ""],
            vec!["جمع بدهی‌های جاری", "", "800,000", ""],
            vec!["جمع کل بدهی‌ها", "", "1,600,000", ""],
            vec!["جمع حقوق صاحبان سهام", "", "2,400,000", ""],
        ])
    }

    fn income_statement() -> Grid {
        Grid::from_text_rows(vec![
            vec!["صورت سود و زیان", "", ""],
            vec!["درآمدهای عملیاتی", "8,000,000", ""],
            vec!["سود ناخالص", "3,000,000", ""],
            vec!["سود عملیاتی", "1,200,000", ""],
            vec!["سود خالص", "(900,000)", "900,000"],
        ])
    }

    #[test]
    fn test_extracts_balance_sheet_metrics() {
        let metrics = MetricExtractor::default().extract(&balance_sheet());
        assert_eq!(metrics.get(CanonicalMetric::CurrentAssets), dec!(1500000));
        assert_eq!(metrics.get(CanonicalMetric::CurrentLiabilities), dec!(800000));
        assert_eq!(metrics.get(CanonicalMetric::Inventory), dec!(300000));
        assert_eq!(metrics.get(CanonicalMetric::Cash), dec!(250000));
        assert_eq!(metrics.get(CanonicalMetric::Equity), dec!(2400000));
        assert_eq!(metrics.get(CanonicalMetric::Sales), Decimal::ZERO);
    }

    #[test]
    fn test_total_assets_takes_the_grand_total() {
        // "دارایی‌ها" also matches the current-assets row; the grand total
        // is the maximum of a tight cluster
        let metrics = MetricExtractor::default().extract(&balance_sheet());
        assert_eq!(metrics.get(CanonicalMetric::TotalAssets), dec!(4000000));
        assert_eq!(metrics.get(CanonicalMetric::TotalLiabilities), dec!(1600000));
    }

    #[test]
    fn test_multi_sheet_first_sheet_wins() {
        let extractor = MetricExtractor::default();
        let override_sheet = Grid::from_text_rows(vec![vec!["موجودی نقد", "999"]]);
        let outcome = extractor.extract_sheets(&[
            balance_sheet(),
            override_sheet,
            income_statement(),
        ]);

        assert_eq!(outcome.metrics.get(CanonicalMetric::Cash), dec!(250000));
        assert_eq!(outcome.metrics.get(CanonicalMetric::Sales), dec!(8000000));
        assert_eq!(outcome.metrics.get(CanonicalMetric::NetProfit), dec!(900000));
        assert_eq!(outcome.unresolved, vec![CanonicalMetric::CostOfGoodsSold]);
        assert!(outcome
            .issues
            .contains(&ExtractionError::MetricNotFound(CanonicalMetric::CostOfGoodsSold)));
    }

    #[test]
    fn test_empty_input_resolves_nothing() {
        let outcome = MetricExtractor::default().extract_sheets(&[]);
        assert_eq!(outcome.metrics, MetricMap::new());
        assert_eq!(outcome.unresolved.len(), CanonicalMetric::COUNT);

        let outcome = MetricExtractor::default().resolve(&[Grid::default()]);
        assert_eq!(outcome.unresolved.len(), CanonicalMetric::COUNT);
    }

    #[test]
    fn test_explain_reports_selection() {
        let grid = Grid::from_text_rows(vec![
            vec!["سود خالص", "10"],
            vec!["سود خالص", "11"],
            vec!["سود خالص", "12"],
            vec!["سود خالص", "9,999,999"],
        ]);
        let extractor = MetricExtractor::default();
        let selection = extractor.explain(&grid, CanonicalMetric::NetProfit).unwrap();
        assert_eq!(selection.value, dec!(12));
        assert_eq!(selection.rule, SelectionRule::Median);
        assert_eq!(selection.distinct, 4);

        let outcome = extractor.extract_sheets(&[grid]);
        assert!(outcome.issues.contains(&ExtractionError::AmbiguousCandidates {
            metric: CanonicalMetric::NetProfit,
            distinct: 4,
        }));
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = AliasCatalog::persian()
            .with_aliases(CanonicalMetric::Sales, vec!["Revenue".to_string()]);
        let extractor = MetricExtractor::new(catalog, ExtractionConfig::default());
        let grid = Grid::from_text_rows(vec![vec!["Total Revenue", "5,000"]]);
        assert_eq!(extractor.extract(&grid).get(CanonicalMetric::Sales), dec!(5000));
    }

    #[test]
    fn test_values_come_from_candidates() {
        let grid = balance_sheet();
        let extractor = MetricExtractor::default();
        let metrics = extractor.extract(&grid);
        for (metric, value) in metrics.iter() {
            if value.is_zero() {
                continue;
            }
            let selection = extractor.explain(&grid, metric).unwrap();
            assert_eq!(selection.candidate.value, value);
        }
    }
}
