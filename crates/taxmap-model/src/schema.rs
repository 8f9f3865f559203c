use serde::{Deserialize, Serialize};

/// One slot in the destination schema of a report type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetField {
    pub key: String,
    pub label: String,
    /// Display grouping only; never consulted when resolving mappings.
    pub group: Option<String>,
}

impl TargetField {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            group: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Ordered target fields for one report type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSchema {
    pub report_type: String,
    pub fields: Vec<TargetField>,
}

impl TargetSchema {
    pub fn new(report_type: impl Into<String>, fields: Vec<TargetField>) -> Self {
        Self {
            report_type: report_type.into(),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&TargetField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Label for a key, falling back to the key itself.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.field(key).map_or(key, |f| f.label.as_str())
    }

    /// Fields bucketed by display group, in first-seen group order.
    pub fn grouped(&self) -> Vec<(Option<&str>, Vec<&TargetField>)> {
        let mut groups: Vec<(Option<&str>, Vec<&TargetField>)> = Vec::new();
        for field in &self.fields {
            let group = field.group.as_deref();
            match groups.iter_mut().find(|(g, _)| *g == group) {
                Some((_, members)) => members.push(field),
                None => groups.push((group, vec![field])),
            }
        }
        groups
    }
}
