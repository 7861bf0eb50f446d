/// A cell that should render as a whole number when it is one.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Renders a numeric-like field without float artifacts.
///
/// - null or blank text renders as `""`.
/// - finite numbers, and text that parses as one, render their integer
///   part (truncated toward zero, so `12.9` and `-12.9` give `12` and `-12`).
/// - anything else is returned as-is.
pub fn format_numeric_field(value: Option<&FieldValue>) -> String {
    match value {
        None => String::new(),
        Some(FieldValue::Number(v)) => truncate(*v).unwrap_or_else(|| v.to_string()),
        Some(FieldValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return String::new();
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(truncate)
                .unwrap_or_else(|| s.clone())
        }
    }
}

/// Reading columns are always numeric once parsed.
pub fn format_reading(value: Option<f64>) -> String {
    format_numeric_field(value.map(FieldValue::Number).as_ref())
}

/// Whether `format_numeric_field` would hand this text back unchanged.
pub fn is_passthrough(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().ok().and_then(truncate).is_none()
}

fn truncate(v: f64) -> Option<String> {
    if !v.is_finite() {
        return None;
    }
    let whole = v.trunc();
    if whole == 0.0 {
        // -0.9 truncates to -0.0
        return Some("0".to_string());
    }
    Some(format!("{whole:.0}"))
}
