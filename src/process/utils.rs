use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(1[5-9]\d{2}|2[0-1]\d{2})\b").expect("year regex should compile"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a human-formatted count such as `"1,234,567"` or `"$3,100"`.
///
/// Thousands separators, spaces, underscores and a leading `$` are ignored.
/// A trailing `.0…` fraction is accepted; anything else non-numeric is `None`.
pub fn parse_count(raw: &str) -> Option<i64> {
    let cleaned: String = clean_str(raw)
        .trim_start_matches('$')
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v);
    }
    // "12345.0" style exports
    match cleaned.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.chars().all(|c| c == '0') => {
            whole.parse::<i64>().ok()
        }
        _ => None,
    }
}

/// Positive population count, or `None`.
pub fn parse_population(raw: &str) -> Option<u64> {
    parse_count(raw).filter(|v| *v > 0).map(|v| v as u64)
}

/// First plausible 4-digit year in a header cell: `"1990"`, `"1990 Census"`,
/// `"July 1, 2023 estimate"`.
pub fn first_year(raw: &str) -> Option<i32> {
    YEAR_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
