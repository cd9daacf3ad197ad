use std::cell::OnceCell;
use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statement_core::{Candidate, CanonicalMetric, ExtractionError, Grid};

use crate::normalize::{normalize, normalize_cell};
use crate::number::NumberParser;

/// How many values a single label match may contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// First positive value in probe order.
    #[default]
    Nearest,
    /// Every positive value inside the probe radius.
    All,
}

impl std::str::FromStr for NeighborPolicy {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(NeighborPolicy::Nearest),
            "all" => Ok(NeighborPolicy::All),
            other => Err(ExtractionError::InvalidConfig(format!(
                "unknown neighbor policy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Furthest column offset probed on each side of a label.
    pub neighbor_radius: usize,
    pub neighbor_policy: NeighborPolicy,
    /// Rescan with rows and columns swapped when the row pass finds nothing.
    pub transposed_fallback: bool,
    /// Upper bound on cells compared against aliases for one metric.
    pub max_cells_per_metric: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            neighbor_radius: 4,
            neighbor_policy: NeighborPolicy::Nearest,
            transposed_fallback: true,
            max_cells_per_metric: 1_000_000,
        }
    }
}

/// Widest probe radius honored; larger settings are clamped.
pub const MAX_NEIGHBOR_RADIUS: usize = 64;

/// Offsets in probe order: +1, -1, +2, -2, ..., +r, -r, then the label cell.
pub fn probe_offsets(radius: usize) -> Vec<isize> {
    let radius = radius.min(MAX_NEIGHBOR_RADIUS);
    let mut offsets = Vec::with_capacity(radius * 2 + 1);
    for d in 1..=radius as isize {
        offsets.push(d);
        offsets.push(-d);
    }
    offsets.push(0);
    offsets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Rows,
    Columns,
}

struct Layer {
    raw: Grid,
    text: Vec<Vec<String>>,
}

impl Layer {
    fn new(raw: Grid) -> Self {
        let text = normalize_rows(&raw);
        Self { raw, text }
    }
}

fn normalize_rows(grid: &Grid) -> Vec<Vec<String>> {
    (0..grid.height())
        .map(|r| grid.row(r).iter().map(normalize_cell).collect())
        .collect()
}

/// A grid with its cells normalized once, shared by every metric scanned
/// over it. The transposed layer is built on first use.
pub struct ScanView<'g> {
    grid: &'g Grid,
    text: Vec<Vec<String>>,
    transposed: OnceCell<Layer>,
}

impl<'g> ScanView<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            text: normalize_rows(grid),
            transposed: OnceCell::new(),
        }
    }

    fn layer(&self, orientation: Orientation) -> (&Grid, &[Vec<String>]) {
        match orientation {
            Orientation::Rows => (self.grid, &self.text),
            Orientation::Columns => {
                let layer = self
                    .transposed
                    .get_or_init(|| Layer::new(self.grid.transposed()));
                (&layer.raw, &layer.text)
            }
        }
    }
}

/// Finds label matches and the numbers sitting next to them.
#[derive(Debug, Clone, Default)]
pub struct CandidateCollector {
    parser: NumberParser,
    config: CollectorConfig,
}

impl CandidateCollector {
    pub fn new(parser: NumberParser, config: CollectorConfig) -> Self {
        Self { parser, config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn collect(&self, grid: &Grid, metric: CanonicalMetric, aliases: &[String]) -> Vec<Candidate> {
        self.collect_in(&ScanView::new(grid), metric, aliases)
    }

    /// Gathers candidates from every alias and every match position.
    pub fn collect_in(
        &self,
        view: &ScanView<'_>,
        metric: CanonicalMetric,
        aliases: &[String],
    ) -> Vec<Candidate> {
        let needles = prepare_aliases(aliases);
        let mut budget = self.config.max_cells_per_metric;
        let mut out = Vec::new();

        let mut exhausted = !self.scan(view, Orientation::Rows, &needles, &mut budget, &mut out);
        if out.is_empty() && !exhausted && self.config.transposed_fallback {
            tracing::debug!("No row-wise candidates for {}, scanning columns", metric.key());
            exhausted = !self.scan(view, Orientation::Columns, &needles, &mut budget, &mut out);
        }
        if exhausted {
            tracing::warn!(
                "Scan budget of {} cells exhausted for {}; keeping {} candidates",
                self.config.max_cells_per_metric,
                metric.key(),
                out.len()
            );
        }

        tracing::debug!("Collected {} candidates for {}", out.len(), metric.key());
        out
    }

    /// Returns false when the budget ran out before the scan finished.
    fn scan(
        &self,
        view: &ScanView<'_>,
        orientation: Orientation,
        needles: &[(String, &str)],
        budget: &mut usize,
        out: &mut Vec<Candidate>,
    ) -> bool {
        let (raw, text) = view.layer(orientation);
        let offsets = probe_offsets(self.config.neighbor_radius);
        let mut matched: HashSet<(usize, usize)> = HashSet::new();

        for (needle, alias) in needles {
            for (r, row) in text.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if *budget == 0 {
                        return false;
                    }
                    *budget -= 1;

                    if cell.is_empty() || !cell.contains(needle.as_str()) {
                        continue;
                    }
                    // A higher-priority alias already claimed this label cell
                    if !matched.insert((r, c)) {
                        continue;
                    }
                    self.probe(raw, orientation, r, c, &offsets, alias, out);
                }
            }
        }
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn probe(
        &self,
        raw: &Grid,
        orientation: Orientation,
        r: usize,
        c: usize,
        offsets: &[isize],
        alias: &str,
        out: &mut Vec<Candidate>,
    ) {
        for offset in offsets {
            let Some(col) = c.checked_add_signed(*offset) else {
                continue;
            };
            match self.parser.try_parse(raw.cell(r, col)) {
                Ok(value) if value > Decimal::ZERO => {
                    let (row, col) = match orientation {
                        Orientation::Rows => (r, col),
                        Orientation::Columns => (col, r),
                    };
                    out.push(Candidate {
                        value,
                        distance: offset.unsigned_abs(),
                        row,
                        col,
                        matched_alias: alias.to_string(),
                    });
                    if self.config.neighbor_policy == NeighborPolicy::Nearest {
                        return;
                    }
                }
                Ok(_) => {}
                Err(rejection) => {
                    tracing::trace!("{}", rejection.at(r, col));
                }
            }
        }
    }
}

/// Normalized, de-duplicated, non-empty aliases paired with the original text.
fn prepare_aliases(aliases: &[String]) -> Vec<(String, &str)> {
    let mut seen = HashSet::new();
    aliases
        .iter()
        .filter_map(|alias| {
            let needle = normalize(alias);
            if needle.is_empty() || !seen.insert(needle.clone()) {
                return None;
            }
            Some((needle, alias.as_str()))
        })
        .collect()
}
