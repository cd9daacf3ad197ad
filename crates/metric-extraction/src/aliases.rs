use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statement_core::{CanonicalMetric, ExtractionError};

/// Built-in label variants as they appear on Persian (Codal-style) statements.
/// Earlier entries win ties during selection.
pub const PERSIAN_ALIASES: &[(CanonicalMetric, &[&str])] = &[
    (
        CanonicalMetric::CurrentAssets,
        &[
            "جمع دارایی‌های جاری",
            "دارایی‌های جاری",
            "جمع داراییهای جاری",
            "داراییهای جاری",
            "جمع دارایی جاری",
            "دارایی جاری",
        ],
    ),
    (
        CanonicalMetric::TotalAssets,
        &[
            "جمع کل دارایی‌ها",
            "جمع دارایی‌ها",
            "جمع داراییها",
            "کل دارایی‌ها",
            "کل داراییها",
            "دارایی‌ها",
        ],
    ),
    (
        CanonicalMetric::CurrentLiabilities,
        &[
            "جمع بدهی‌های جاری",
            "بدهی‌های جاری",
            "جمع بدهیهای جاری",
            "بدهیهای جاری",
            "جمع بدهی جاری",
            "بدهی جاری",
        ],
    ),
    (
        CanonicalMetric::TotalLiabilities,
        &[
            "جمع کل بدهی‌ها",
            "جمع بدهی‌ها",
            "جمع بدهیها",
            "کل بدهی‌ها",
            "کل بدهیها",
            "بدهی‌ها",
        ],
    ),
    (
        CanonicalMetric::Sales,
        &[
            "درآمدهای عملیاتی",
            "جمع درآمدهای عملیاتی",
            "فروش خالص",
            "درآمد عملیاتی",
            "درآمد حاصل از فروش",
            "فروش",
        ],
    ),
    (
        CanonicalMetric::GrossProfit,
        &[
            "سود ناخالص",
            "سود (زیان) ناخالص",
            "سود و زیان ناخالص",
            "سود/زیان ناخالص",
            "سودناخالص",
        ],
    ),
    (
        CanonicalMetric::OperatingProfit,
        &[
            "سود عملیاتی",
            "سود (زیان) عملیاتی",
            "سود و زیان عملیاتی",
            "سود/زیان عملیاتی",
            "سودعملیاتی",
        ],
    ),
    (
        CanonicalMetric::NetProfit,
        &[
            "سود خالص",
            "سود (زیان) خالص",
            "سود (زیان) خالص دوره",
            "سود و زیان خالص",
            "سود/زیان خالص",
            "سودخالص",
        ],
    ),
    (
        CanonicalMetric::Inventory,
        &[
            "موجودی مواد و کالا",
            "موجودی کالا",
            "موجودی مواد، کالا و قطعات",
            "موجودی مواد اولیه و کالا",
            "موجودی‌های مواد و کالا",
            "موجودی‌ها",
        ],
    ),
    (
        CanonicalMetric::Receivables,
        &[
            "حساب‌های دریافتنی تجاری",
            "حسابهای دریافتنی تجاری",
            "دریافتنی‌های تجاری",
            "حسابها و اسناد دریافتنی تجاری",
            "حساب‌های دریافتنی",
            "حسابهای دریافتنی",
        ],
    ),
    (
        CanonicalMetric::Equity,
        &[
            "جمع حقوق صاحبان سهام",
            "حقوق صاحبان سهام",
            "جمع حقوق مالکانه",
            "حقوق مالکانه",
        ],
    ),
    (
        CanonicalMetric::CostOfGoodsSold,
        &[
            "بهای تمام‌شده درآمدهای عملیاتی",
            "بهای تمام شده کالای فروش رفته",
            "بهای تمام شده فروش",
        ],
    ),
    (
        CanonicalMetric::Cash,
        &[
            "موجودی نقد",
            "وجه نقد",
            "وجوه نقد",
            "موجودی نقد و بانک",
            "نقد و معادل نقد",
            "موجودی نقد و معادل نقد",
        ],
    ),
];

/// Ordered label variants per canonical metric.
///
/// Immutable once built; construct a new catalog to change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<CanonicalMetric, Vec<String>>",
    into = "BTreeMap<CanonicalMetric, Vec<String>>"
)]
pub struct AliasCatalog {
    aliases: [Vec<String>; CanonicalMetric::COUNT],
}

impl AliasCatalog {
    /// The built-in Persian catalog.
    pub fn persian() -> Self {
        let mut aliases: [Vec<String>; CanonicalMetric::COUNT] = Default::default();
        for (metric, labels) in PERSIAN_ALIASES {
            aliases[metric.index()] = labels.iter().map(|s| s.to_string()).collect();
        }
        Self { aliases }
    }

    /// Builds a catalog covering every metric. Missing metrics or blank
    /// labels are rejected.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (CanonicalMetric, Vec<String>)>,
    ) -> Result<Self, ExtractionError> {
        let mut aliases: [Vec<String>; CanonicalMetric::COUNT] = Default::default();
        for (metric, labels) in entries {
            if let Some(blank) = labels.iter().position(|l| l.trim().is_empty()) {
                return Err(ExtractionError::InvalidCatalog(format!(
                    "blank alias at position {blank} for {}",
                    metric.key()
                )));
            }
            aliases[metric.index()] = labels;
        }
        if let Some(missing) = CanonicalMetric::ALL
            .iter()
            .find(|m| aliases[m.index()].is_empty())
        {
            return Err(ExtractionError::InvalidCatalog(format!(
                "no aliases for {}",
                missing.key()
            )));
        }
        Ok(Self { aliases })
    }

    /// Parses `{"current_assets": ["...", ...], ...}`.
    pub fn from_json(json: &str) -> Result<Self, ExtractionError> {
        serde_json::from_str(json).map_err(|e| ExtractionError::InvalidCatalog(e.to_string()))
    }

    /// Copy of this catalog with one metric's labels replaced.
    pub fn with_aliases(mut self, metric: CanonicalMetric, labels: Vec<String>) -> Self {
        self.aliases[metric.index()] = labels;
        self
    }

    pub fn aliases(&self, metric: CanonicalMetric) -> &[String] {
        &self.aliases[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalMetric, &[String])> + '_ {
        CanonicalMetric::ALL
            .iter()
            .map(move |m| (*m, self.aliases(*m)))
    }
}

impl Default for AliasCatalog {
    fn default() -> Self {
        Self::persian()
    }
}

impl TryFrom<BTreeMap<CanonicalMetric, Vec<String>>> for AliasCatalog {
    type Error = ExtractionError;

    fn try_from(map: BTreeMap<CanonicalMetric, Vec<String>>) -> Result<Self, Self::Error> {
        Self::from_entries(map)
    }
}

impl From<AliasCatalog> for BTreeMap<CanonicalMetric, Vec<String>> {
    fn from(catalog: AliasCatalog) -> Self {
        CanonicalMetric::ALL
            .iter()
            .map(|m| (*m, catalog.aliases[m.index()].clone()))
            .collect()
    }
}
