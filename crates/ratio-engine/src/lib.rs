//! Ratio Engine
//!
//! Computes liquidity, profitability, leverage and activity ratios from a
//! resolved [`MetricMap`](statement_core::MetricMap). Every division is
//! guarded: near-zero denominators and overflow read as zero, never as an
//! error or a non-finite value.

pub mod catalog;
pub mod engine;
pub mod safe_div;

pub use catalog::{CatalogError, RatioCatalog, RatioDefinition, RatioFormula, Term};
pub use engine::{derive_cost_of_goods_sold, RatioConfig, RatioEngine};
pub use safe_div::{safe_divide, try_divide, DivisionGuard, DEFAULT_EPSILON, DEFAULT_PRECISION};
