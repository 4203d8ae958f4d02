//! The text side: semicolon-delimited `CODE;TEXTE` tables.

use std::fs;
use std::path::Path;

use crate::encoding::{decode_text, TextEncoding};
use crate::error::{EroError, Result};
use crate::record::{Outcome, Record, SkipReason};

/// Parsed table: accepted rows plus the lines that were discarded,
/// with 1-based line numbers.
#[derive(Debug, Default)]
pub struct TableSummary {
    pub records: Vec<Record>,
    pub skipped: Vec<(usize, SkipReason)>,
}

/// Split one line on the first `;`. Both fields are trimmed; blank lines
/// and lines without a separator are skipped, never fatal.
pub fn parse_line(line: &str) -> Outcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Outcome::Skipped(SkipReason::BlankLine);
    }
    match trimmed.split_once(';') {
        Some((code, text)) => Outcome::Accepted(Record::new(code.trim(), text.trim())),
        None => Outcome::Skipped(SkipReason::MissingSeparator),
    }
}

/// Parse a whole table, one record per line.
pub fn parse_table(content: &str) -> TableSummary {
    let mut summary = TableSummary::default();
    for (idx, line) in content.lines().enumerate() {
        match parse_line(line) {
            Outcome::Accepted(record) => summary.records.push(record),
            Outcome::Skipped(reason) => {
                tracing::debug!(line = idx + 1, reason = reason.describe(), "line skipped");
                summary.skipped.push((idx + 1, reason));
            }
        }
    }
    summary
}

/// Read and parse a table file. UTF-8 with BOM sniffing, WINDOWS-1252
/// fallback; the encoding actually used is returned alongside the rows.
pub fn read_table(path: impl AsRef<Path>) -> Result<(TableSummary, TextEncoding)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EroError::InputNotFound(path.to_path_buf()));
    }
    let raw = fs::read(path)?;
    let (content, encoding) = decode_text(&raw);
    Ok((parse_table(&content), encoding))
}

/// Write records as `CODE;TEXTE` lines. Numeric codes are re-normalized to
/// four zero-padded digits, non-numeric codes pass through untouched. The
/// output is UTF-8 with a leading BOM, matching what the legacy tooling
/// around this format expects to re-open.
pub fn write_table(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let mut out = String::from('\u{FEFF}');
    for record in records {
        out.push_str(&format_row(record));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

fn format_row(record: &Record) -> String {
    match record.code.parse::<u32>() {
        Ok(n) => format!("{n:04};{}", record.text),
        Err(_) => format!("{};{}", record.code, record.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_split_on_the_first_semicolon() {
        let outcome = parse_line("42;Salle Machines; annexe");
        assert_eq!(
            outcome,
            Outcome::Accepted(Record::new("42", "Salle Machines; annexe"))
        );
    }

    #[test]
    fn malformed_lines_are_classified() {
        assert_eq!(parse_line("   "), Outcome::Skipped(SkipReason::BlankLine));
        assert_eq!(
            parse_line("no separator here"),
            Outcome::Skipped(SkipReason::MissingSeparator)
        );
    }

    #[test]
    fn table_collects_rows_and_skips() {
        let summary = parse_table("42;Salle Machines\n\nbroken line\n100;Local Serveur\n");
        assert_eq!(summary.records.len(), 2);
        assert_eq!(
            summary.skipped,
            vec![(2, SkipReason::BlankLine), (3, SkipReason::MissingSeparator)]
        );
    }

    #[test]
    fn written_rows_renormalize_numeric_codes_only() {
        assert_eq!(format_row(&Record::new("42", "Salle")), "0042;Salle");
        assert_eq!(format_row(&Record::new("BATI", "Zone Nord")), "BATI;Zone Nord");
    }
}
