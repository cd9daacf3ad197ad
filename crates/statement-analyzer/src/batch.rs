use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metric_extraction::ascii_digits;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statement_core::{Grid, MetricResolver, RatioCalculator};

use crate::pipeline::{StatementPipeline, StatementReport};
use crate::trends::{ratio_trends, RatioTrend, DEFAULT_TREND_RATIOS};

/// One company's statement for one period, already read into grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementInput {
    pub company: String,
    pub period: String,
    pub sheets: Vec<Grid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementAnalysis {
    pub company: String,
    pub period: String,
    #[serde(flatten)]
    pub report: StatementReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub statements: Vec<StatementAnalysis>,
    pub trends: Vec<RatioTrend>,
}

/// Analyzes every statement on the current rayon pool. Output is sorted by
/// company, then period; equal keys keep input order.
pub fn analyze_batch<R, C>(
    pipeline: &StatementPipeline<R, C>,
    inputs: &[StatementInput],
) -> Vec<StatementAnalysis>
where
    R: MetricResolver,
    C: RatioCalculator,
{
    let mut analyses: Vec<StatementAnalysis> = inputs
        .par_iter()
        .map(|input| {
            let report = pipeline.analyze(&input.sheets);
            if !report.unresolved.is_empty() {
                tracing::warn!(
                    "{} {}: {} unresolved metrics",
                    input.company,
                    input.period,
                    report.unresolved.len()
                );
            }
            StatementAnalysis {
                company: input.company.clone(),
                period: input.period.clone(),
                report,
            }
        })
        .collect();

    analyses.sort_by_cached_key(|a| (a.company.clone(), PeriodKey::parse(&a.period)));
    analyses
}

/// Runs a batch on a dedicated pool when `threads` is set, then builds the
/// default trend series.
pub fn run_batch<R, C>(
    pipeline: &StatementPipeline<R, C>,
    inputs: &[StatementInput],
    threads: Option<usize>,
) -> Result<BatchReport>
where
    R: MetricResolver,
    C: RatioCalculator,
{
    tracing::info!("Analyzing {} statements", inputs.len());

    let statements = match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .context("Failed to build analyzer thread pool")?;
            pool.install(|| analyze_batch(pipeline, inputs))
        }
        None => analyze_batch(pipeline, inputs),
    };

    let trends = ratio_trends(&statements, DEFAULT_TREND_RATIOS);
    tracing::info!(
        "Analyzed {} statements across {} trend series",
        statements.len(),
        trends.len()
    );

    Ok(BatchReport {
        generated_at: Utc::now(),
        statements,
        trends,
    })
}

/// Sort key for a period label. Numeric labels (fiscal years, in Latin or
/// Persian digits) order by value and come before every textual label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PeriodKey {
    Numeric(i64),
    Text(String),
}

impl PeriodKey {
    fn parse(period: &str) -> Self {
        let ascii = ascii_digits(period.trim());
        match ascii.parse::<i64>() {
            Ok(n) => PeriodKey::Numeric(n),
            Err(_) => PeriodKey::Text(ascii),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StatementPipeline;

    fn key(period: &str) -> PeriodKey {
        PeriodKey::parse(period)
    }

    #[test]
    fn test_period_ordering() {
        assert!(key("1399") < key("1402"));
        assert!(key("999") < key("1000"));
        assert!(key("1402-Q1") < key("1402-Q2"));
        assert_eq!(key("۱۴۰۲"), key("1402"));
        assert!(key("۱۳۹۹") < key("1400"));
    }

    #[test]
    fn test_mixed_period_formats_order_totally() {
        // Numbers before text, so no cycle between 9, 10 and "1x"
        assert!(key("9") < key("10"));
        assert!(key("10") < key("1x"));
        assert!(key("9") < key("1x"));
        assert!(key("1402") < key("FY1401"));
    }

    #[test]
    fn test_batch_sort_with_mixed_periods() {
        let inputs: Vec<StatementInput> = (0..400)
            .map(|i| StatementInput {
                company: format!("company-{}", i % 3),
                period: if i % 2 == 0 {
                    (i % 37).to_string()
                } else {
                    format!("{}x", i % 41)
                },
                sheets: Vec::new(),
            })
            .collect();
        let analyses = analyze_batch(&StatementPipeline::standard(), &inputs);
        assert_eq!(analyses.len(), 400);

        let keys: Vec<(String, PeriodKey)> = analyses
            .iter()
            .map(|a| (a.company.clone(), key(&a.period)))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
}
