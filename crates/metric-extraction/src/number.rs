use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statement_core::{CellValue, ExtractionError};
use thiserror::Error;

use crate::normalize::ascii_digits;

/// Tokens that only decorate an amount. Stripped before the digit filter so
/// that abbreviations with dots cannot leak a decimal point.
const CURRENCY_NOISE: &[&str] = &[
    "میلیون ریال",
    "ریال",
    "ريال",
    "تومان",
    "م.ر",
    "Rls.",
    "Rls",
    "IRR",
    "IRT",
    "USD",
    "$",
    "\u{FDFC}",
];

const MINUS_VARIANTS: &[char] = &[
    '\u{2212}', '\u{2010}', '\u{2011}', '\u{2013}', '\u{2014}', '\u{FE63}', '\u{FF0D}',
];

static DELIMITED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}|\d{1,2}[/\-.]\d{1,2}[/\-.]\d{4})$")
        .expect("valid delimited date pattern")
});

static COMPACT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(13|14|19|20)\d{2}(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])$")
        .expect("valid compact date pattern")
});

/// Why a cell did not yield a number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRejection {
    #[error("empty cell")]
    Empty,

    #[error("no numeric content in {0:?}")]
    Malformed(String),

    #[error("more than one decimal point in {0:?}")]
    MultipleDecimalPoints(String),

    #[error("{0} is outside the accepted magnitude band")]
    OutOfRange(Decimal),

    #[error("date-shaped token {0:?}")]
    DateLike(String),
}

impl ParseRejection {
    pub fn at(self, row: usize, col: usize) -> ExtractionError {
        ExtractionError::UnparseableCell {
            row,
            col,
            reason: self.to_string(),
        }
    }
}

/// Plausibility limits for parsed amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Smallest accepted absolute value; exact zero is always accepted.
    pub min_magnitude: Decimal,
    pub max_magnitude: Decimal,
    pub reject_date_like: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_magnitude: dec!(0.0000000001),
            max_magnitude: dec!(1000000000000),
            reject_date_like: true,
        }
    }
}

/// Converts cell content into decimal amounts.
#[derive(Debug, Clone, Default)]
pub struct NumberParser {
    config: ParserConfig,
}

impl NumberParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Total: anything that is not a plausible amount reads as zero.
    pub fn parse(&self, cell: &CellValue) -> Decimal {
        self.try_parse(cell).unwrap_or(Decimal::ZERO)
    }

    pub fn parse_str(&self, text: &str) -> Decimal {
        self.try_parse_str(text).unwrap_or(Decimal::ZERO)
    }

    pub fn try_parse(&self, cell: &CellValue) -> Result<Decimal, ParseRejection> {
        match cell {
            CellValue::Empty => Err(ParseRejection::Empty),
            CellValue::Number(value) => Ok(*value),
            CellValue::Text(text) => self.try_parse_str(text),
        }
    }

    pub fn try_parse_str(&self, text: &str) -> Result<Decimal, ParseRejection> {
        let text = ascii_digits(text.trim());
        if text.is_empty() {
            return Err(ParseRejection::Empty);
        }
        if self.config.reject_date_like && is_date_like(&text) {
            return Err(ParseRejection::DateLike(text));
        }

        let cleaned = clean_numeric(&text);
        let value = to_decimal(&cleaned)?;

        let magnitude = value.abs();
        if magnitude.is_zero() {
            return Ok(Decimal::ZERO);
        }
        if magnitude < self.config.min_magnitude || magnitude > self.config.max_magnitude {
            return Err(ParseRejection::OutOfRange(value));
        }
        Ok(value)
    }
}

/// `1402/12/29`, `29-12-1402` or a bare `20231231`.
pub fn is_date_like(text: &str) -> bool {
    DELIMITED_DATE.is_match(text) || COMPACT_DATE.is_match(text)
}

/// Reduces text to an optional leading `-`, digits and `.`.
fn clean_numeric(text: &str) -> String {
    let mut s = text.to_string();
    for token in CURRENCY_NOISE {
        s = s.replace(token, "");
    }

    let negative = s.contains('(') && s.contains(')');
    let mut body = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            ',' | '\u{066C}' | '%' | '\u{066A}' | '(' | ')' => {}
            '\u{066B}' => body.push('.'),
            c if MINUS_VARIANTS.contains(&c) => body.push('-'),
            c if c.is_ascii_digit() || c == '.' || c == '-' => body.push(c),
            _ => {}
        }
    }

    if negative && !body.starts_with('-') {
        body.insert(0, '-');
    }
    body
}

fn to_decimal(cleaned: &str) -> Result<Decimal, ParseRejection> {
    let malformed = || ParseRejection::Malformed(cleaned.to_string());

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned),
    };
    if digits.contains('-') {
        return Err(malformed());
    }
    if digits.matches('.').count() > 1 {
        return Err(ParseRejection::MultipleDecimalPoints(cleaned.to_string()));
    }
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let digits = digits.trim_end_matches('.');
    let digits = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };

    let value = Decimal::from_str(&digits).map_err(|_| malformed())?;
    Ok(if negative { -value } else { value })
}
