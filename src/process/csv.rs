use csv::{ReaderBuilder, Terminator, Trim};
use tracing::warn;

/// One delimited record. Column meaning is positional and set per table.
pub type RawRow = Vec<String>;

/// Parse delimited text into trimmed rows.
///
/// Never fails: rows the reader rejects are logged and skipped, blank lines
/// produce no row, and rows may have differing lengths. Quoted commas,
/// newlines and `""` escapes are handled by the reader.
pub fn parse_csv(text: &str) -> Vec<RawRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .terminator(Terminator::CRLF)
        .from_reader(text.as_bytes());

    let mut rows: Vec<RawRow> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!(row = idx + 1, error = %e, "skipping unreadable CSV row"),
        }
    }
    rows
}

/// True when every cell is empty after trimming.
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}
