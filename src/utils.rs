use crate::error::{ReportTableError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses an as-of reference date in `YYYY-MM-DD` form, as supplied by a
/// report query parameter or date picker.
pub fn parse_as_of_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ReportTableError::DateError(format!(
            "Invalid as-of date '{}'. Expected YYYY-MM-DD",
            raw
        ))
    })
}

/// Parses an amount field that the API may supply as a number, a numeric
/// string (optionally comma-grouped), or null.
///
/// Returns the parsed value plus a flag marking an amount that was present
/// but non-numeric. Absent/null amounts parse to 0.0 without the flag.
pub fn parse_amount(value: &Value) -> (f64, bool) {
    match value {
        Value::Null => (0.0, false),
        Value::Number(n) => (n.as_f64().unwrap_or(0.0), false),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return (0.0, false);
            }
            match trimmed.replace(',', "").parse::<f64>() {
                Ok(v) if v.is_finite() => (v, false),
                _ => (0.0, true),
            }
        }
        _ => (0.0, true),
    }
}

/// Serde helper: amount as number or numeric string, anything else 0.0.
pub fn de_flexible_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(parse_amount(&value).0)
}

/// Serde helper: optional amount with the same leniency as
/// [`de_flexible_amount`]; absent, null, and malformed all map to `None`.
pub fn de_opt_flexible_amount<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => {
            let (parsed, malformed) = parse_amount(&v);
            if malformed {
                None
            } else {
                Some(parsed)
            }
        }
    })
}

/// Serde helper: optional ISO date. Missing, null, empty, and unparseable
/// strings all deserialize to `None` rather than failing the whole payload.
pub fn de_opt_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

/// Formats an account name with display indentation, four spaces per
/// depth level, matching the dashboard rendering.
pub fn indent_name(name: &str, depth: usize) -> String {
    format!("{}{}", "    ".repeat(depth), name)
}

/// Quotes a CSV field when it contains a comma, quote, or newline.
pub fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
