//! Measurement field model.

use serde::{Deserialize, Serialize};

/// One line of a measurement sheet.
///
/// A `Header` opens a section; the `Value` fields after it belong to that
/// section until the next header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasurementField {
    Header { label: String },
    Value { label: String, value: String },
}

impl MeasurementField {
    pub fn header(label: impl Into<String>) -> Self {
        MeasurementField::Header {
            label: label.into(),
        }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        MeasurementField::Value {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MeasurementField::Header { label } | MeasurementField::Value { label, .. } => label,
        }
    }

    /// Empty for headers.
    pub fn value(&self) -> &str {
        match self {
            MeasurementField::Header { .. } => "",
            MeasurementField::Value { value, .. } => value,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, MeasurementField::Header { .. })
    }
}

/// A header and the value fields grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementSection {
    /// `None` for value fields that appear before the first header.
    pub title: Option<String>,
    pub fields: Vec<MeasurementField>,
}

impl MeasurementSection {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.label().eq_ignore_ascii_case(label))
            .map(MeasurementField::value)
    }
}
