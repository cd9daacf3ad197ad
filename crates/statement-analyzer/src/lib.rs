//! Statement Analyzer
//!
//! Runs the extraction and ratio stages over batches of statements:
//! - [`StatementPipeline`] turns the sheets of one statement into metric
//!   and ratio maps
//! - [`analyze_batch`] fans statements out over a rayon pool and orders the
//!   results by company and period
//! - [`ratio_trends`] builds per-company series of key ratios for charting
//! - [`AnalyzerConfig`] reads the tunables from the environment

pub mod batch;
pub mod config;
pub mod pipeline;
pub mod trends;


pub use batch::{analyze_batch, run_batch, BatchReport, StatementAnalysis, StatementInput};
pub use config::AnalyzerConfig;
pub use pipeline::{StatementPipeline, StatementReport};
pub use trends::{ratio_trends, RatioTrend, TrendPoint, DEFAULT_TREND_RATIOS};
