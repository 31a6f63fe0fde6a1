use super::kind::FieldKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Input constraints attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self == &FieldValidation::default()
    }
}

// Older pages send `validation: ""` instead of an object.
fn lenient_validation<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FieldValidation, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => {
            serde_json::from_value(Value::Object(map)).map_err(serde::de::Error::custom)
        }
        _ => Ok(FieldValidation::default()),
    }
}

fn default_width() -> u8 {
    100
}

/// A single input element definition: the unit both designers edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Data key the submitted value is stored under.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default_value: String,
    #[serde(default, deserialize_with = "lenient_validation")]
    pub validation: FieldValidation,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help_text: String,
    #[serde(default)]
    pub order: i32,
    /// Width as a percentage of the row.
    #[serde(default = "default_width")]
    pub width: u8,
    /// Type-specific properties, kept as raw JSON.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Field {
    /// A field of `kind` with the designer's defaults filled in.
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: kind.default_label().to_string(),
            name: String::new(),
            field: String::new(),
            placeholder: kind.default_placeholder().to_string(),
            required: false,
            options: kind.default_options(),
            default_value: String::new(),
            validation: FieldValidation::default(),
            help_text: String::new(),
            order: 0,
            width: 100,
            properties: Map::new(),
            kind,
        }
    }
}

/// The editable subset of a field, as submitted from a property panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub default_value: Option<String>,
    pub validation: Option<FieldValidation>,
    pub help_text: Option<String>,
    pub field: Option<String>,
    pub width: Option<u8>,
    pub properties: Option<Map<String, Value>>,
}

impl FieldPatch {
    pub fn apply_to(self, field: &mut Field) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(placeholder) = self.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
        if let Some(default_value) = self.default_value {
            field.default_value = default_value;
        }
        if let Some(validation) = self.validation {
            field.validation = validation;
        }
        if let Some(help_text) = self.help_text {
            field.help_text = help_text;
        }
        if let Some(key) = self.field {
            field.field = key;
        }
        if let Some(width) = self.width {
            field.width = width.clamp(10, 100);
        }
        if let Some(properties) = self.properties {
            field.properties = properties;
        }
    }
}
