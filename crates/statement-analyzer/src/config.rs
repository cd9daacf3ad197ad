use anyhow::{Context, Result};
use metric_extraction::{AliasCatalog, ExtractionConfig, MetricExtractor};
use ratio_engine::{RatioCatalog, RatioConfig, RatioEngine};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::StatementPipeline;

#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub extraction: ExtractionConfig,
    pub ratios: RatioConfig,

    // Catalog overrides (JSON files)
    pub alias_catalog_path: Option<PathBuf>,
    pub ratio_catalog_path: Option<PathBuf>,

    // Worker pool size; rayon's default when unset
    pub threads: Option<usize>,
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ExtractionConfig::default();
        let mut extraction = defaults.clone();

        // Candidate collection
        extraction.collector.neighbor_radius = parse_or(
            &lookup,
            "EXTRACTION_NEIGHBOR_RADIUS",
            defaults.collector.neighbor_radius,
        )?;
        extraction.collector.neighbor_policy = parse_or(
            &lookup,
            "EXTRACTION_NEIGHBOR_POLICY",
            defaults.collector.neighbor_policy,
        )?;
        extraction.collector.transposed_fallback = parse_or(
            &lookup,
            "EXTRACTION_TRANSPOSED_FALLBACK",
            defaults.collector.transposed_fallback,
        )?;
        extraction.collector.max_cells_per_metric = parse_or(
            &lookup,
            "EXTRACTION_MAX_CELLS_PER_METRIC",
            defaults.collector.max_cells_per_metric,
        )?;

        // Candidate selection
        extraction.selector.outlier_filter.multiplier = parse_or(
            &lookup,
            "EXTRACTION_IQR_MULTIPLIER",
            defaults.selector.outlier_filter.multiplier,
        )?;
        extraction.selector.outlier_filter.min_distinct = parse_or(
            &lookup,
            "EXTRACTION_IQR_MIN_DISTINCT",
            defaults.selector.outlier_filter.min_distinct,
        )?;
        extraction.selector.dispersion.threshold = parse_or(
            &lookup,
            "EXTRACTION_DISPERSION_THRESHOLD",
            defaults.selector.dispersion.threshold,
        )?;

        let ratios = RatioConfig {
            precision: parse_or(&lookup, "RATIO_PRECISION", RatioConfig::default().precision)?,
            ..RatioConfig::default()
        };

        let threads = match lookup("ANALYZER_THREADS") {
            Some(raw) => {
                let n: usize = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("ANALYZER_THREADS={raw} is not a number"))?;
                (n > 0).then_some(n)
            }
            None => None,
        };

        let config = Self {
            extraction,
            ratios,
            alias_catalog_path: lookup("ALIAS_CATALOG_PATH").map(PathBuf::from),
            ratio_catalog_path: lookup("RATIO_CATALOG_PATH").map(PathBuf::from),
            threads,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()?;
        self.ratios.validate()?;
        Ok(())
    }

    pub fn alias_catalog(&self) -> Result<AliasCatalog> {
        match &self.alias_catalog_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read alias catalog {}", path.display()))?;
                let catalog = AliasCatalog::from_json(&raw)
                    .with_context(|| format!("Invalid alias catalog {}", path.display()))?;
                tracing::info!("Loaded alias catalog from {}", path.display());
                Ok(catalog)
            }
            None => Ok(AliasCatalog::persian()),
        }
    }

    pub fn ratio_catalog(&self) -> Result<RatioCatalog> {
        match &self.ratio_catalog_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read ratio catalog {}", path.display()))?;
                let catalog = RatioCatalog::from_json(&raw)
                    .with_context(|| format!("Invalid ratio catalog {}", path.display()))?;
                tracing::info!(
                    "Loaded {} ratio definitions from {}",
                    catalog.len(),
                    path.display()
                );
                Ok(catalog)
            }
            None => Ok(RatioCatalog::standard()),
        }
    }

    pub fn build_pipeline(&self) -> Result<StatementPipeline> {
        let extractor = MetricExtractor::new(self.alias_catalog()?, self.extraction.clone());
        let engine = RatioEngine::new(self.ratio_catalog()?, self.ratios.clone());
        Ok(StatementPipeline::new(extractor, engine))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
