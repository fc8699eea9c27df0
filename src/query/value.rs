use serde::Serialize;

/// The right-hand side of a query, classified once at compile time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryValue {
    /// No value given (`key=`): any value matches
    Any,
    /// A value that only supports string comparison
    Text(String),
    /// A value that also parses as a number
    Number { text: String, number: f64 },
}

impl QueryValue {
    pub fn new(text: &str) -> Self {
        if text.is_empty() {
            return QueryValue::Any;
        }
        match parse_number(text) {
            Some(number) => QueryValue::Number {
                text: text.to_string(),
                number,
            },
            None => QueryValue::Text(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryValue::Any => "",
            QueryValue::Text(text) | QueryValue::Number { text, .. } => text,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            QueryValue::Number { number, .. } => Some(*number),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, QueryValue::Any)
    }
}

/// Parse the numeric part of a value.
///
/// Anything from the first `#` on is ignored (hashed values in some maps);
/// without a `#`, anything from the first space on is ignored, so `"255 0"`
/// reads as 255. The remaining text must be a complete float literal.
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let head = match value.find('#') {
        Some(pos) => &value[..pos],
        None => value.split(' ').next().unwrap_or(""),
    };
    let head = head.trim_end();
    if head.is_empty() {
        return None;
    }
    head.parse::<f64>().ok().filter(|n| !n.is_nan())
}
