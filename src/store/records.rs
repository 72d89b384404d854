//! Execution, artifact and event records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed value of a store property.
///
/// Serialized the way the store's JSON export writes values, e.g.
/// `{"int_value": 3}` or `{"string_value": "0.9"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Integer value
    #[serde(rename = "int_value")]
    Int(i64),
    /// Double value
    #[serde(rename = "double_value")]
    Double(f64),
    /// String value
    #[serde(rename = "string_value")]
    String(String),
}

impl PropertyValue {
    /// Get the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A recorded invocation of a pipeline component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    id: i64,
    type_name: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
}

impl Execution {
    /// Create an execution record without properties.
    #[must_use]
    pub fn new(id: i64, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a property, replacing any previous value.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Get the execution ID.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Get the execution type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get all properties.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// Get a property as a string, if it exists and is string-typed.
    #[must_use]
    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::as_str)
    }
}

/// A recorded pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    id: i64,
    type_name: String,
    #[serde(default)]
    custom_properties: BTreeMap<String, PropertyValue>,
}

impl Artifact {
    /// Create an artifact record without custom properties.
    #[must_use]
    pub fn new(id: i64, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            custom_properties: BTreeMap::new(),
        }
    }

    /// Add a custom property, replacing any previous value.
    #[must_use]
    pub fn with_custom_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.custom_properties.insert(name.into(), value.into());
        self
    }

    /// Get the artifact ID.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Get the artifact type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get all custom properties.
    #[must_use]
    pub const fn custom_properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.custom_properties
    }
}

/// Link between an execution and an artifact it produced or consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    execution_id: i64,
    artifact_id: i64,
}

impl Event {
    /// Create an event linking `execution_id` to `artifact_id`.
    #[must_use]
    pub const fn new(execution_id: i64, artifact_id: i64) -> Self {
        Self {
            execution_id,
            artifact_id,
        }
    }

    /// Get the execution ID.
    #[must_use]
    pub const fn execution_id(&self) -> i64 {
        self.execution_id
    }

    /// Get the artifact ID.
    #[must_use]
    pub const fn artifact_id(&self) -> i64 {
        self.artifact_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_string_property() {
        let execution = Execution::new(1, "Trainer")
            .with_property("run_id", "123")
            .with_property("attempt", 2_i64);
        assert_eq!(execution.string_property("run_id"), Some("123"));
        assert_eq!(execution.string_property("attempt"), None);
        assert_eq!(execution.string_property("missing"), None);
    }

    #[test]
    fn test_property_value_json_format() {
        let json = serde_json::to_string(&PropertyValue::Int(3)).unwrap();
        assert_eq!(json, r#"{"int_value":3}"#);

        let value: PropertyValue = serde_json::from_str(r#"{"string_value":"0.9"}"#).unwrap();
        assert_eq!(value, PropertyValue::from("0.9"));
    }

    #[test]
    fn test_artifact_deserialize_without_properties() {
        let artifact: Artifact =
            serde_json::from_str(r#"{"id": 4, "type_name": "Result"}"#).unwrap();
        assert_eq!(artifact.id(), 4);
        assert!(artifact.custom_properties().is_empty());
    }
}
