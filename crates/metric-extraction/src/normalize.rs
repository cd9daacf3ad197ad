//! Text canonicalization for label matching.
//!
//! Persian statements arrive with a mix of Arabic and Persian code points for
//! the same glyph, zero-width joiners inside words and irregular spacing.
//! Aliases and cells both go through [`normalize`] before comparison.

use statement_core::CellValue;

/// Collapses whitespace (zero-width joiners included) into single spaces,
/// trims the ends and unifies yeh/kaf forms and Arabic-Indic digits.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if is_separator(ch) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(unify_glyph(ch));
    }
    out
}

/// Text cells are normalized; empty and numeric cells yield `""`.
pub fn normalize_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => normalize(s),
        CellValue::Empty | CellValue::Number(_) => String::new(),
    }
}

/// Maps Persian and Arabic-Indic digits to ASCII, leaving everything else.
pub fn ascii_digits(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{06F0}'..='\u{06F9}' => shift(ch, 0x06F0, '0' as u32),
            '\u{0660}'..='\u{0669}' => shift(ch, 0x0660, '0' as u32),
            _ => ch,
        })
        .collect()
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

fn unify_glyph(ch: char) -> char {
    match ch {
        // Arabic yeh, alef maksura
        '\u{064A}' | '\u{0649}' => '\u{06CC}',
        // Arabic kaf
        '\u{0643}' => '\u{06A9}',
        '\u{0660}'..='\u{0669}' => shift(ch, 0x0660, 0x06F0),
        _ => ch,
    }
}

fn shift(ch: char, from: u32, to: u32) -> char {
    char::from_u32(ch as u32 - from + to).unwrap_or(ch)
}
