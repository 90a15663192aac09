//! Subject builders
//!
//! Provides builder patterns for constructing subject records with only the
//! fields a test cares about. Everything not set is simply absent, which the
//! engine scores with neutral defaults.

use serde_json::{Map, Value};

/// Builder for a subject record
#[derive(Debug, Clone, Default)]
pub struct SubjectBuilder {
    fields: Map<String, Value>,
}

impl SubjectBuilder {
    /// Creates an empty subject
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an arbitrary field
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Sets a nested field using a dot path such as `claimant.previousClaims`
    pub fn with_path(mut self, path: &str, value: impl Into<Value>) -> Self {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            return self;
        };
        let mut current = &mut self.fields;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just made an object"),
            };
        }
        current.insert(leaf.to_string(), value.into());
        self
    }

    /// Sets the subject identifier
    pub fn with_id(self, id: &str) -> Self {
        self.with("id", id)
    }

    /// Sets the applicant age
    pub fn with_age(self, age: u32) -> Self {
        self.with("age", age)
    }

    /// Sets the requested coverage amount
    pub fn with_coverage(self, amount: u64) -> Self {
        self.with("coverageAmount", amount)
    }

    /// Sets the claimed amount
    pub fn with_amount(self, amount: f64) -> Self {
        self.with("amount", amount)
    }

    /// Sets the claim narrative
    pub fn with_description(self, text: &str) -> Self {
        self.with("description", text)
    }

    /// Sets a list field from string items
    pub fn with_list(self, field: &str, items: &[&str]) -> Self {
        let values: Vec<Value> = items.iter().map(|item| Value::from(*item)).collect();
        self.with(field, values)
    }

    /// Sets the incident and claim dates (ISO `YYYY-MM-DD`)
    pub fn with_dates(self, incident: &str, claim: &str) -> Self {
        self.with("incidentDate", incident).with("claimDate", claim)
    }

    /// Builds the subject as a JSON object
    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}
