use serde_json::{Map, Value};

use super::model::{Category, Classification, Severity};
use crate::error::{ProviderError, SchemaError, TriageError};

const PREVIEW_LIMIT: usize = 256;

/// Removes an optional surrounding Markdown code fence (```` ```json ```` or
/// ```` ``` ````) and surrounding whitespace.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string on the opening fence line, if there is one.
    let body = match rest.find('\n') {
        Some(idx) if !rest[..idx].contains('{') => &rest[idx + 1..],
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses raw provider text into a validated [`Classification`].
///
/// Text that is not a single JSON object is a [`ProviderError`]; a JSON object
/// that violates the schema is a [`SchemaError`].
pub fn parse_classification(raw: &str) -> Result<Classification, TriageError> {
    let text = strip_code_fence(raw);
    let value: Value = serde_json::from_str(text).map_err(|err| {
        ProviderError::Unparseable(format!("{err} | body={}", preview(text)))
    })?;

    let Value::Object(obj) = value else {
        return Err(ProviderError::Unparseable(format!(
            "expected a single JSON object | body={}",
            preview(text)
        ))
        .into());
    };

    Ok(validate_classification(&obj)?)
}

/// Field-by-field validation of an already parsed object.
pub fn validate_classification(obj: &Map<String, Value>) -> Result<Classification, SchemaError> {
    let category_raw = require_str(obj, "category")?;
    let category = Category::parse(category_raw).ok_or_else(|| SchemaError::InvalidVariant {
        field: "category",
        value: category_raw.to_string(),
    })?;

    let severity_raw = require_str(obj, "severity")?;
    let severity = Severity::parse(severity_raw).ok_or_else(|| SchemaError::InvalidVariant {
        field: "severity",
        value: severity_raw.to_string(),
    })?;

    let auto_fixable = require(obj, "autoFixable")?
        .as_bool()
        .ok_or(SchemaError::WrongType {
            field: "autoFixable",
            expected: "boolean",
        })?;

    let confidence = require(obj, "confidence")?
        .as_f64()
        .ok_or(SchemaError::WrongType {
            field: "confidence",
            expected: "number",
        })?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(SchemaError::ConfidenceOutOfRange(confidence));
    }

    let rationale = require_str(obj, "rationale")?.trim().to_string();

    let open_questions = string_list(require(obj, "openQuestions")?, "openQuestions")?;

    let acceptance_criteria = match obj.get("acceptanceCriteria") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => string_list(v, "acceptanceCriteria")?,
    };

    let fix_instructions = match obj.get("fixInstructions") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(_) => {
            return Err(SchemaError::WrongType {
                field: "fixInstructions",
                expected: "string or null",
            })
        }
    };

    Ok(Classification {
        category,
        severity,
        auto_fixable,
        confidence,
        rationale,
        open_questions,
        acceptance_criteria,
        fix_instructions,
    })
}

fn require<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, SchemaError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(SchemaError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn require_str<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, SchemaError> {
    require(obj, field)?.as_str().ok_or(SchemaError::WrongType {
        field,
        expected: "string",
    })
}

/// Array of strings; blank entries are dropped.
fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, SchemaError> {
    let Value::Array(items) = value else {
        return Err(SchemaError::NotASequence(field));
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let s = item.as_str().ok_or(SchemaError::WrongType {
            field,
            expected: "array of strings",
        })?;
        let s = s.trim();
        if !s.is_empty() {
            out.push(s.to_string());
        }
    }
    Ok(out)
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_LIMIT).collect();
    if text.chars().count() > PREVIEW_LIMIT {
        out.push_str("...");
    }
    if out.is_empty() {
        out.push_str("<empty>");
    }
    out
}
