//! Splitting OCR text into a line-item region and a footer region.

use super::patterns::{SUBTOTAL_ANCHOR, TABLE_HEADER};

/// Line-oriented view of a document with its two region boundaries.
///
/// `table_lines()` is `lines[table_start..footer_start]` and `footer_lines()`
/// is `lines[footer_start..]`. The ranges never share an index.
#[derive(Debug, Clone)]
pub struct Regions<'a> {
    lines: Vec<&'a str>,
    table_start: usize,
    footer_start: usize,
}

impl<'a> Regions<'a> {
    /// Split `text` into trimmed, non-empty lines and locate both regions.
    pub fn locate(text: &'a str) -> Self {
        Self::from_lines(split_lines(text))
    }

    /// Locate both regions over already-split lines.
    pub fn from_lines(lines: Vec<&'a str>) -> Self {
        let table_start = lines
            .iter()
            .position(|l| TABLE_HEADER.is_match(l))
            .unwrap_or(0);
        let footer_start = lines
            .iter()
            .rposition(|l| SUBTOTAL_ANCHOR.is_match(l))
            .unwrap_or(lines.len());

        Self {
            lines,
            table_start,
            footer_start,
        }
    }

    /// All trimmed, non-empty lines.
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Index of the table header line, 0 when there is none.
    pub fn table_start(&self) -> usize {
        self.table_start
    }

    /// Index of the last subtotal line, `lines().len()` when there is none.
    pub fn footer_start(&self) -> usize {
        self.footer_start
    }

    /// Lines between the table header and the footer.
    ///
    /// Empty when the header comes after the footer anchor.
    pub fn table_lines(&self) -> &[&'a str] {
        if self.table_start > self.footer_start {
            return &[];
        }
        &self.lines[self.table_start..self.footer_start]
    }

    /// Lines from the last subtotal anchor to the end of the document.
    pub fn footer_lines(&self) -> &[&'a str] {
        &self.lines[self.footer_start..]
    }
}

/// Trimmed, non-empty lines of `text`.
///
/// Breaks on every Unicode line boundary, not only `\n` and `\r`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split(is_line_break)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
