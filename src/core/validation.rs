//! Field-level validation errors for local forms

use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to message; empty means the form is valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed ({})", summary(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless `value` has non-blank content
    pub fn require(&mut self, field: &str, value: Option<&str>, message: &str) -> &mut Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(field, message);
        }
        self
    }

    /// Record a message; the first message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn summary(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_blank_values() {
        let mut errors = ValidationErrors::new();
        errors
            .require("name", Some("  "), "Project name is required")
            .require("code", None, "Project code is required")
            .require("owner", Some("QA"), "Owner is required");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Project name is required"));
        assert!(errors.get("owner").is_none());
    }

    #[test]
    fn test_first_message_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("id", "Part Id is required").add("id", "Duplicate");
        assert_eq!(errors.get("id"), Some("Part Id is required"));
    }

    #[test]
    fn test_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("set", "Select a set");
        assert_eq!(errors.to_string(), "validation failed (set: Select a set)");
        assert!(errors.into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
