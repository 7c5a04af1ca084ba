use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::SummaryResult;

/// Drop a surrounding markdown code fence, if any.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the info string (```json)
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_object(raw: &str) -> Result<serde_json::Map<String, Value>> {
    let value: Value = serde_json::from_str(strip_fences(raw))
        .map_err(|e| Error::Gateway(format!("model returned invalid JSON: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Gateway(
            "model response is not a JSON object".to_string(),
        )),
    }
}

/// Parse the final structured summary.
pub fn parse_summary(raw: &str) -> Result<SummaryResult> {
    let map = parse_object(raw)?;

    let summary = match map.get("summary") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            return Err(Error::Gateway(
                "model response is missing a non-empty 'summary'".to_string(),
            ))
        }
    };

    let technologies = match map.get("technologies") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(Error::Gateway(format!(
                    "'technologies' entries must be strings, got {}",
                    other
                ))),
            })
            .filter(|t| !matches!(t, Ok(s) if s.is_empty()))
            .collect::<Result<Vec<_>>>()?,
        _ => {
            return Err(Error::Gateway(
                "model response is missing the 'technologies' array".to_string(),
            ))
        }
    };

    let structure = match map.get("structure") {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => {
            return Err(Error::Gateway(
                "model response is missing the 'structure' string".to_string(),
            ))
        }
    };

    Ok(SummaryResult {
        summary,
        technologies,
        structure,
    })
}

/// Parse a Pass-1 response: plain text, or a `{"file_summary": "..."}`
/// object when the model answers in JSON anyway.
pub fn parse_file_summary(raw: &str) -> Result<String> {
    let text = strip_fences(raw);
    let summary = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => match map.get("file_summary") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => {
                return Err(Error::Gateway(
                    "model response is missing the 'file_summary' string".to_string(),
                ))
            }
        },
        _ => text.to_string(),
    };
    if summary.is_empty() {
        return Err(Error::Gateway("model returned an empty file summary".to_string()));
    }
    Ok(summary)
}
