//! Metric Extraction
//!
//! Locates canonical financial line items in loosely labeled statement grids.
//!
//! Each metric goes through the same stages:
//! - label matching against an [`AliasCatalog`] on normalized text
//! - collecting numeric [`Candidate`](statement_core::Candidate)s near each match
//! - reducing the candidates to one value with an IQR fence and a
//!   dispersion switch
//!
//! Malformed cells never fail the extraction; they read as "no value" and the
//! metric falls back to zero.

pub mod aliases;
pub mod collector;
pub mod config;
pub mod extractor;
pub mod normalize;
pub mod number;
pub mod selector;

pub use aliases::{AliasCatalog, PERSIAN_ALIASES};
pub use collector::{
    probe_offsets, CandidateCollector, CollectorConfig, NeighborPolicy, ScanView,
    MAX_NEIGHBOR_RADIUS,
};
pub use config::ExtractionConfig;
pub use extractor::MetricExtractor;
pub use normalize::{ascii_digits, normalize, normalize_cell};
pub use number::{is_date_like, NumberParser, ParseRejection, ParserConfig};
pub use selector::{
    CandidateSelector, DispersionSwitch, IqrFence, Selection, SelectionRule, SelectorConfig,
};
