//! Display formatting for submitted values.
//!
//! Every function here is total: any value/type pair produces a definite
//! string, and unparseable input degrades to its sanitized text form.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use unicode_normalization::UnicodeNormalization;

use crate::model::{FieldType, SubmissionRecord, Value};

pub const NOT_AVAILABLE: &str = "N/A";
pub const CURRENCY_SYMBOL: char = '\u{20A6}'; // ₦
const DATE_FORMAT: &str = "%d/%m/%Y";

/// UTF-8 decoded as Latin-1/CP1252 leftovers, byte-order marks and
/// zero-width characters that upstream exports leave behind.
const MOJIBAKE: &[&str] = &[
    "\u{E2}\u{201A}\u{A6}",       // ₦
    "\u{E2}\u{20AC}\u{2122}",     // ’
    "\u{E2}\u{20AC}\u{2DC}",      // ‘
    "\u{E2}\u{20AC}\u{153}",      // “
    "\u{E2}\u{20AC}\u{201C}",     // –
    "\u{E2}\u{20AC}\u{201D}",     // —
    "\u{E2}\u{20AC}\u{A6}",       // …
    "\u{E2}\u{20AC}\u{A2}",       // •
    "\u{E2}\u{20AC}",
    "\u{C3}\u{201A}",
    "\u{EF}\u{BB}\u{BF}",
    "\u{FFFD}",
    "\u{FEFF}",
    "\u{200B}",
];

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

/// `Â` left in front of a Latin-1 symbol (U+00A0..=U+00BF) when UTF-8 was
/// read as Latin-1. A standalone `Â` is a real letter and stays.
fn strip_stray_circumflex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        let stray = c == '\u{C2}' && chars.peek().is_some_and(|n| ('\u{A0}'..='\u{BF}').contains(n));
        if !stray {
            out.push(c);
        }
    }
    out
}

fn sanitize_pass(input: &str) -> String {
    let normalized: String = input.nfc().collect();
    let mut s: String = normalized
        .chars()
        .map(|c| if is_control(c) { ' ' } else { c })
        .collect();
    loop {
        let before = s.len();
        for pattern in MOJIBAKE {
            if s.contains(pattern) {
                s = s.replace(pattern, "");
            }
        }
        if s.contains('\u{C2}') {
            s = strip_stray_circumflex(&s);
        }
        if s.len() == before {
            break;
        }
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// NFC-normalize, blank out control characters, strip mojibake artifacts,
/// collapse whitespace and trim. Repeated until stable, so the result is a
/// fixed point: `sanitize(sanitize(s)) == sanitize(s)`.
pub fn sanitize(input: &str) -> String {
    let mut current = sanitize_pass(input);
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Free-text booleans as stored by some form widgets.
pub fn normalize_boolean(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn yes_no(b: bool) -> String {
    if b { "Yes" } else { "No" }.to_string()
}

/// Format `value` for display as a field of the declared type.
pub fn format_value(value: &Value, field_type: FieldType) -> String {
    if value.is_blank() {
        return NOT_AVAILABLE.to_string();
    }
    // Boolean-like text wins over the declared type.
    if let Value::Text(s) = value
        && let Some(b) = normalize_boolean(s)
    {
        return yes_no(b);
    }
    if let Value::Bool(b) = value {
        return yes_no(*b);
    }

    let out = match field_type {
        FieldType::Date => format_date(value),
        FieldType::Currency => format_currency(value),
        _ => plain_text(value),
    };
    if out.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        out
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => yes_no(*b),
        Value::Number(n) => format_number(*n),
        Value::Text(s) => sanitize(s),
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        Value::Array(_) | Value::Object(_) => inline_summary(value),
    }
}

/// Integral numbers without a fractional part, others in shortest form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One-line rendering of a nested value, used inside table cells and
/// sub-blocks where structured layout is not available.
pub fn inline_summary(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_blank())
            .map(inline_summary)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(rec) => rec
            .iter()
            .filter(|(_, v)| !v.is_blank())
            .map(|(k, v)| format!("{}: {}", humanize_label(k), inline_summary(v)))
            .collect::<Vec<_>>()
            .join("; "),
        Value::Text(s) => match normalize_boolean(s) {
            Some(b) => yes_no(b),
            None => sanitize(s),
        },
        other => plain_text(other),
    }
}

fn timestamp_wrapper(rec: &SubmissionRecord) -> Option<NaiveDateTime> {
    let seconds = match rec.get("seconds").or_else(|| rec.get("_seconds"))? {
        Value::Number(n) => *n as i64,
        _ => return None,
    };
    let nanos = match rec.get("nanoseconds").or_else(|| rec.get("_nanoseconds")) {
        Some(Value::Number(n)) => *n as u32,
        _ => 0,
    };
    DateTime::from_timestamp(seconds, nanos).map(|dt| dt.naive_utc())
}

fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse any supported date representation: native date, database
/// timestamp wrapper, epoch milliseconds or a date string.
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Object(rec) => timestamp_wrapper(rec),
        Value::Number(ms) => DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.naive_utc()),
        Value::Text(s) => parse_date_text(s),
        _ => None,
    }
}

/// Day/month/year, or the raw value as text when it is not a date.
pub fn format_date(value: &Value) -> String {
    match parse_date(value) {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => plain_text(value),
    }
}

/// Numeric amount of a currency-ish value, ignoring symbols and separators.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::Text(s) => {
            let cleaned = sanitize(s);
            let mut t = cleaned.as_str();
            for prefix in ["NGN", "ngn", "Ngn"] {
                t = t.trim_start_matches(prefix);
            }
            let digits: String = t
                .chars()
                .filter(|c| !matches!(c, '\u{20A6}' | '$' | '\u{A3}' | '\u{20AC}' | ','))
                .filter(|c| !c.is_whitespace())
                .collect();
            let digits = match digits.strip_prefix(['N', 'n']) {
                Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
                _ => digits.as_str(),
            };
            digits.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Amount with two decimals and thousands separators, prefixed by `symbol`.
pub fn format_amount(amount: f64, symbol: Option<char>) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    let symbol = symbol.map(String::from).unwrap_or_default();
    format!("{sign}{symbol}{}.{frac_part}", group_thousands(int_part))
}

/// `₦1,234.50`; non-numeric input falls back to its sanitized text.
pub fn format_currency(value: &Value) -> String {
    match parse_amount(value) {
        Some(n) => format_amount(n, Some(CURRENCY_SYMBOL)),
        None => plain_text(value),
    }
}

/// `companyName` / `company_name` / `company-name` → `Company Name`.
pub fn humanize_label(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            let boundary = match prev {
                Some(p) => {
                    (ch.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()))
                        || (ch.is_ascii_digit() && p.is_alphabetic())
                }
                None => false,
            };
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
        prev = Some(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Key spellings used by the various forms for the privacy-consent checkbox.
const PRIVACY_KEYS: &[&str] = &[
    "agreetodataprivacy",
    "dataprivacyagreement",
    "dataprivacyconsent",
    "privacyagreement",
    "privacyconsent",
    "consenttodataprivacy",
    "acceptdataprivacy",
];

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True for privacy/agreement consent checkboxes, which never render as
/// data rows. Matches on the key or label with case and separators removed:
/// either one of `PRIVACY_KEYS`, or "agree", "data" and "privacy" all present.
pub fn is_privacy_field(key: &str, label: &str) -> bool {
    [key, label].iter().any(|text| {
        let s = squash(text);
        PRIVACY_KEYS.contains(&s.as_str())
            || (s.contains("agree") && s.contains("data") && s.contains("privacy"))
    })
}
