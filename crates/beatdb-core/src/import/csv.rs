//! Line-level CSV helpers: a quote-aware splitter and the lenient numeric
//! parse used for coordinate cells.

/// Split one line of CSV text on commas, honouring double-quoted fields.
///
/// A `"` toggles quoted mode and is dropped from the output; commas inside
/// quotes do not split. There is no escape sequence for a literal quote.
/// Always yields at least one field.
#[must_use]
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Trim a cell and strip any single or double quote characters left in it.
pub(crate) fn clean_cell(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "")
}

/// Normalize a header token: trimmed, lower-cased, quote-free.
pub(crate) fn normalize_header(raw: &str) -> String {
    clean_cell(raw).to_lowercase()
}

/// Parse the leading decimal number of `raw`, ignoring any trailing text.
///
/// Mirrors spreadsheet-style leniency: `"12.5 N"` parses as `12.5`, while a
/// cell with no leading digits yields `None`. Non-finite results are
/// rejected.
pub(crate) fn parse_leading_f64(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
