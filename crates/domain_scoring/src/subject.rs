//! Subject records
//!
//! A subject is the claim or policy application under evaluation, supplied by
//! the caller as a JSON object. This module gives evaluators typed, read-only
//! access to its fields. Lookups distinguish three cases: a field that is
//! absent (or `null`) yields `Ok(None)`, a field with a usable value yields
//! `Ok(Some(..))`, and a field of the wrong shape yields an
//! [`EvaluationError`].

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::EvaluationError;

/// Fields consulted, in order, for a subject identifier
pub const ID_FIELDS: [&str; 5] = ["id", "subjectId", "claimId", "applicationId", "policyId"];

/// Read-only view over a subject's fields
#[derive(Debug, Clone, Copy)]
pub struct SubjectRecord<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> SubjectRecord<'a> {
    /// Wraps a JSON value, which must be an object
    pub fn from_value(value: &'a Value) -> Result<Self, EvaluationError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(EvaluationError::NotAnObject(json_kind(other))),
        }
    }

    /// Returns true if the subject carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves a dot path such as `claimant.previousClaims`
    ///
    /// JSON `null` is treated as absent.
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Reads a number
    ///
    /// Numeric strings are accepted, ignoring currency symbols, thousands
    /// separators and surrounding whitespace. A blank string counts as absent.
    pub fn number(&self, path: &str) -> Result<Option<f64>, EvaluationError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let cleaned = clean_numeric(s);
                if cleaned.is_empty() {
                    return Ok(None);
                }
                Some(
                    cleaned
                        .parse::<f64>()
                        .map_err(|_| EvaluationError::type_mismatch(path, "number", quoted(s)))?,
                )
            }
            other => return Err(EvaluationError::type_mismatch(path, "number", json_kind(other))),
        };
        match number {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(EvaluationError::NonFinite {
                field: path.to_string(),
            }),
        }
    }

    /// Reads an exact decimal amount
    ///
    /// Accepts the same inputs as [`SubjectRecord::number`] but keeps the
    /// decimal digits as written, so `5000.10` stays `5000.10`.
    pub fn decimal(&self, path: &str) -> Result<Option<Decimal>, EvaluationError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => {
                let cleaned = clean_numeric(s);
                if cleaned.is_empty() {
                    return Ok(None);
                }
                cleaned
            }
            other => return Err(EvaluationError::type_mismatch(path, "number", json_kind(other))),
        };
        match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
            Ok(amount) => Ok(Some(amount)),
            Err(_) if text.parse::<f64>().is_ok_and(f64::is_finite) => {
                Err(EvaluationError::OutOfRange {
                    field: path.to_string(),
                    value: text,
                })
            }
            Err(_) => Err(EvaluationError::type_mismatch(path, "number", quoted(&text))),
        }
    }

    /// Reads free text
    ///
    /// Arrays of strings are joined with spaces so that keyword rules can
    /// scan list fields like `drivingViolations`.
    pub fn text(&self, path: &str) -> Result<Option<String>, EvaluationError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Array(items) => {
                let parts = string_items(path, items, "text")?;
                Ok(Some(parts.join(" ")))
            }
            other => Err(EvaluationError::type_mismatch(path, "text", json_kind(other))),
        }
    }

    /// Reads one or more categories
    ///
    /// An empty array counts as absent.
    pub fn categories(&self, path: &str) -> Result<Option<Vec<String>>, EvaluationError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::String(s) => Ok(Some(vec![s.clone()])),
            Value::Number(n) => Ok(Some(vec![n.to_string()])),
            Value::Array(items) => {
                let parts = string_items(path, items, "category")?;
                Ok(if parts.is_empty() { None } else { Some(parts) })
            }
            other => Err(EvaluationError::type_mismatch(path, "category", json_kind(other))),
        }
    }

    /// Counts the entries of a list field
    ///
    /// Unlike [`SubjectRecord::categories`], an empty array or blank string
    /// is a count of zero. A comma-separated string counts its parts and a
    /// non-negative integer is taken as the count itself.
    pub fn item_count(&self, path: &str) -> Result<Option<usize>, EvaluationError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        match value {
            Value::Array(items) => Ok(Some(items.iter().filter(|item| !item.is_null()).count())),
            Value::String(s) => Ok(Some(
                s.split(',').filter(|part| !part.trim().is_empty()).count(),
            )),
            Value::Number(n) => n
                .as_u64()
                .and_then(|count| usize::try_from(count).ok())
                .map(Some)
                .ok_or_else(|| EvaluationError::type_mismatch(path, "list", n.to_string())),
            other => Err(EvaluationError::type_mismatch(path, "list", json_kind(other))),
        }
    }

    /// Reads an ISO date (`YYYY-MM-DD`, or an RFC 3339 timestamp)
    pub fn date(&self, path: &str) -> Result<Option<NaiveDate>, EvaluationError> {
        let Some(value) = self.lookup(path) else {
            return Ok(None);
        };
        let Value::String(raw) = value else {
            return Err(EvaluationError::type_mismatch(path, "date", json_kind(value)));
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
            .map(Some)
            .map_err(|_| EvaluationError::InvalidDate {
                field: path.to_string(),
                value: raw.to_string(),
            })
    }

    /// Returns the subject's identifier, if it carries one
    pub fn subject_id(&self) -> Option<String> {
        ID_FIELDS.iter().find_map(|field| match self.fields.get(*field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}

/// Returns the JSON type name used in error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn clean_numeric(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '_' | ' '))
        .collect()
}

fn quoted(raw: &str) -> String {
    format!("\"{raw}\"")
}

fn string_items(
    path: &str,
    items: &[Value],
    expected: &'static str,
) -> Result<Vec<String>, EvaluationError> {
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(EvaluationError::type_mismatch(
                path,
                expected,
                format!("array of {}", json_kind(other)),
            )),
        })
        .collect()
}
