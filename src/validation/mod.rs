//! Presence validation and field extraction against a flat field schema.
//!
//! A schema only says which keys a record may carry and which of them must be
//! present. Values are never inspected: `""`, `0` and `null` all count as
//! present, and nothing is coerced.

use serde_json::{Map, Value};

/// A flat record as it travels between request bodies and the catalog store.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
}

/// Static map of field name to required flag.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    fields: &'static [Field],
}

impl FieldSchema {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// True iff every required field is present in `record`.
    pub fn validate(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .filter(|f| f.required)
            .all(|f| record.contains_key(f.name))
    }

    /// Same as [`validate`](Self::validate) for an arbitrary JSON body.
    /// Anything other than an object fails.
    pub fn validate_value(&self, body: &Value) -> bool {
        body.as_object().map_or(false, |record| self.validate(record))
    }

    /// Copy of `record` restricted to schema keys. Absent keys stay absent.
    pub fn extract_fields(&self, record: &Record) -> Record {
        self.fields
            .iter()
            .filter_map(|f| record.get(f.name).map(|v| (f.name.to_string(), v.clone())))
            .collect()
    }
}
