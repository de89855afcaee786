//! Write-body validation
//!
//! Walks the decoded body once and collects every violated constraint, so a
//! caller fixing a request sees all problems at the same time.

use serde_json::{Map, Value};
use vecgate_common::{FieldIssue, IssueCode, PathSegment, Result, VecgateError};

use crate::types::{Metadata, Sex, WriteRequest};

pub const MIN_YEAR: i64 = 1900;
pub const MAX_YEAR: i64 = 2025;

/// Parse raw body bytes and validate them as a write
pub fn parse_write_body(body: &[u8]) -> Result<WriteRequest> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| VecgateError::malformed_input(e.to_string()))?;
    validate_write_request(&value)
}

/// Validate a decoded body as a write
pub fn validate_write_request(body: &Value) -> Result<WriteRequest> {
    let Some(object) = body.as_object() else {
        return Err(VecgateError::Validation(vec![FieldIssue::new(
            Vec::new(),
            IssueCode::InvalidType,
            format!("expected object, received {}", type_name(body)),
        )]));
    };

    let mut issues = Vec::new();

    let id = non_empty_string(object, "id", &[], &mut issues);
    let metadata = validate_metadata(object.get("metadata"), &mut issues);
    let payload = validate_payload(object, &mut issues);

    match (id, metadata, payload) {
        (Some(id), Some(metadata), Some(payload)) if issues.is_empty() => Ok(match payload {
            Payload::Vector(vector) => WriteRequest::Vector {
                id,
                vector,
                metadata,
            },
            Payload::Text(text) => WriteRequest::Text { id, text, metadata },
        }),
        _ => Err(VecgateError::Validation(issues)),
    }
}

enum Payload {
    Text(String),
    Vector(Vec<f32>),
}

fn validate_metadata(value: Option<&Value>, issues: &mut Vec<FieldIssue>) -> Option<Metadata> {
    let base = ["metadata"];
    let object = match value {
        None | Some(Value::Null) => {
            issues.push(issue(&base, IssueCode::Required, "metadata is required"));
            return None;
        }
        Some(Value::Object(object)) => object,
        Some(other) => {
            issues.push(issue(
                &base,
                IssueCode::InvalidType,
                format!("expected object, received {}", type_name(other)),
            ));
            return None;
        }
    };

    let category = non_empty_string(object, "category", &base, issues);
    let year = validate_year(object.get("year"), issues);
    let sex = validate_sex(object.get("sex"), issues);

    Some(Metadata {
        category: category?,
        year: year?,
        sex: sex?,
    })
}

fn validate_year(value: Option<&Value>, issues: &mut Vec<FieldIssue>) -> Option<i32> {
    let path = ["metadata", "year"];
    let number = match value {
        None | Some(Value::Null) => {
            issues.push(issue(&path, IssueCode::Required, "year is required"));
            return None;
        }
        Some(Value::Number(n)) => n,
        Some(other) => {
            issues.push(issue(
                &path,
                IssueCode::InvalidType,
                format!("expected number, received {}", type_name(other)),
            ));
            return None;
        }
    };

    let year = match number.as_i64() {
        Some(year) => year,
        None => match number.as_f64() {
            // 2000.0 is still an integer
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => {
                issues.push(issue(&path, IssueCode::NotInteger, "year must be an integer"));
                return None;
            }
        },
    };

    if year < MIN_YEAR {
        issues.push(issue(
            &path,
            IssueCode::TooSmall,
            format!("year must be at least {}", MIN_YEAR),
        ));
        return None;
    }
    if year > MAX_YEAR {
        issues.push(issue(
            &path,
            IssueCode::TooBig,
            format!("year must be at most {}", MAX_YEAR),
        ));
        return None;
    }

    i32::try_from(year).ok()
}

fn validate_sex(value: Option<&Value>, issues: &mut Vec<FieldIssue>) -> Option<Sex> {
    let path = ["metadata", "sex"];
    match value {
        None | Some(Value::Null) => {
            issues.push(issue(&path, IssueCode::Required, "sex is required"));
            None
        }
        Some(Value::String(raw)) => {
            let sex = Sex::parse(raw);
            if sex.is_none() {
                issues.push(issue(
                    &path,
                    IssueCode::InvalidEnumValue,
                    format!(
                        "expected one of {}, received '{}'",
                        Sex::VARIANTS.join(" | "),
                        raw
                    ),
                ));
            }
            sex
        }
        Some(other) => {
            issues.push(issue(
                &path,
                IssueCode::InvalidType,
                format!("expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

/// `vector` wins when present; `text` is only required without it
fn validate_payload(object: &Map<String, Value>, issues: &mut Vec<FieldIssue>) -> Option<Payload> {
    match object.get("vector") {
        None => {}
        Some(vector) => {
            let parsed = validate_vector(vector, issues);
            // text rides along untouched in vector mode, but must still be a string
            match object.get("text") {
                None | Some(Value::Null) | Some(Value::String(_)) => {}
                Some(other) => issues.push(issue(
                    &["text"],
                    IssueCode::InvalidType,
                    format!("expected string, received {}", type_name(other)),
                )),
            }
            return parsed.map(Payload::Vector);
        }
    }

    match object.get("text") {
        Some(Value::String(text)) if !text.is_empty() => Some(Payload::Text(text.clone())),
        other => {
            let (code, message) = match other {
                None | Some(Value::Null) => (IssueCode::Required, "text is required".to_string()),
                Some(Value::String(_)) => (IssueCode::TooSmall, "text must not be empty".to_string()),
                Some(v) => (
                    IssueCode::InvalidType,
                    format!("expected string, received {}", type_name(v)),
                ),
            };
            issues.push(issue(&["text"], code, message));
            issues.push(issue(
                &["vector"],
                IssueCode::Required,
                "either text or vector is required",
            ));
            None
        }
    }
}

fn validate_vector(value: &Value, issues: &mut Vec<FieldIssue>) -> Option<Vec<f32>> {
    let Value::Array(items) = value else {
        issues.push(issue(
            &["vector"],
            IssueCode::InvalidType,
            format!("expected array, received {}", type_name(value)),
        ));
        return None;
    };

    if items.is_empty() {
        issues.push(issue(
            &["vector"],
            IssueCode::TooSmall,
            "vector must have at least 1 element",
        ));
        return None;
    }

    let before = issues.len();
    let mut vector = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_f64() {
            Some(n) if (n as f32).is_finite() => vector.push(n as f32),
            Some(_) => issues.push(FieldIssue::new(
                vec!["vector".into(), PathSegment::Index(i)],
                IssueCode::TooBig,
                "number does not fit in a 32-bit float",
            )),
            None => issues.push(FieldIssue::new(
                vec!["vector".into(), PathSegment::Index(i)],
                IssueCode::InvalidType,
                format!("expected number, received {}", type_name(item)),
            )),
        }
    }

    (issues.len() == before).then_some(vector)
}

fn non_empty_string(
    object: &Map<String, Value>,
    key: &str,
    base: &[&str],
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    let mut path: Vec<&str> = base.to_vec();
    path.push(key);

    match object.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            issues.push(issue(&path, IssueCode::TooSmall, format!("{} is required", key)));
            None
        }
        None | Some(Value::Null) => {
            issues.push(issue(&path, IssueCode::Required, format!("{} is required", key)));
            None
        }
        Some(other) => {
            issues.push(issue(
                &path,
                IssueCode::InvalidType,
                format!("expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn issue(path: &[&str], code: IssueCode, message: impl Into<String>) -> FieldIssue {
    FieldIssue::new(path.iter().map(|&p| p.into()).collect(), code, message)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
