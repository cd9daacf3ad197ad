use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Content of one cell as handed over by the spreadsheet reader.
///
/// JSON `null` reads as `Empty`, strings as `Text` and numbers as `Number`.
/// Integer literals within the 64-bit range are taken exactly; fractional
/// and larger literals go through `f64`, so readers that need every digit
/// of such a value should hand it over as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Decimal> for CellValue {
    fn from(d: Decimal) -> Self {
        CellValue::Number(d)
    }
}

struct CellValueVisitor;

impl<'de> Visitor<'de> for CellValueVisitor {
    type Value = CellValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("null, a string or a number")
    }

    fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
        Ok(CellValue::Empty)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<CellValue, E> {
        Ok(CellValue::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<CellValue, E> {
        Ok(CellValue::Text(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<CellValue, E> {
        Ok(CellValue::Number(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<CellValue, E> {
        Ok(CellValue::Number(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<CellValue, E> {
        Decimal::try_from(value)
            .map(CellValue::Number)
            .map_err(|_| E::custom(format!("number {value} is out of decimal range")))
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellValueVisitor)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Two-dimensional sheet content. Rows may have different lengths; any
/// position outside a row reads as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Builds a grid of text cells, mostly useful for fixtures.
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| CellValue::Text(s.into())).collect())
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// True when no cell carries any content.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(CellValue::is_blank)
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Rows become columns. Short rows are padded with empty cells so the
    /// result is rectangular.
    pub fn transposed(&self) -> Grid {
        let width = self.width();
        let rows = (0..width)
            .map(|col| {
                (0..self.height())
                    .map(|row| self.cell(row, col).clone())
                    .collect()
            })
            .collect();
        Grid { rows }
    }
}
