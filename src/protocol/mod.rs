//! The cross-frame message contract between the wizard host and a step frame.
//!
//! Every message is a JSON object whose `type` field names the variant, with
//! the payload flattened next to it:
//!
//! ```json
//! {"type": "update_data", "section": "controls", "data": [...]}
//! {"type": "validation_result", "isValid": false, "message": "..."}
//! ```

use crate::error::ProtocolError;
use crate::model::FormModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod port;

pub use port::{FramePort, MessageChannel, send_best_effort};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Message {
    /// Frame asks the host for the current model.
    GetData,
    /// Host answers `GetData` with the whole model.
    FormData { data: Box<FormModel> },
    /// Frame replaces one named section of the host model.
    UpdateData { section: String, data: Value },
    /// Asks the receiver to validate its step.
    Validate,
    ValidationResult {
        is_valid: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    NextStep,
    PrevStep,
    /// Host tells a frame it is about to be removed.
    Cleanup,
}

const KNOWN_TYPES: &[&str] = &[
    "get_data",
    "form_data",
    "update_data",
    "validate",
    "validation_result",
    "next_step",
    "prev_step",
    "cleanup",
];

impl Message {
    pub fn form_data(model: &FormModel) -> Self {
        Message::FormData {
            data: Box::new(model.clone()),
        }
    }

    pub fn update_data(section: impl Into<String>, data: Value) -> Self {
        Message::UpdateData {
            section: section.into(),
            data,
        }
    }

    pub fn validation_result(is_valid: bool, message: Option<String>) -> Self {
        Message::ValidationResult { is_valid, message }
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::GetData => "get_data",
            Message::FormData { .. } => "form_data",
            Message::UpdateData { .. } => "update_data",
            Message::Validate => "validate",
            Message::ValidationResult { .. } => "validation_result",
            Message::NextStep => "next_step",
            Message::PrevStep => "prev_step",
            Message::Cleanup => "cleanup",
        }
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        serde_json::to_value(self).map_err(|e| ProtocolError::Decode(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Decode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ProtocolError::Decode(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decodes a received message, telling apart a missing tag, a tag nobody
    /// handles, and a known tag with a broken payload.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let tag = match value.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => return Err(ProtocolError::UnknownType(other.to_string())),
            None => return Err(ProtocolError::MissingType),
        };
        if !KNOWN_TYPES.contains(&tag.as_str()) {
            return Err(ProtocolError::UnknownType(tag));
        }
        serde_json::from_value(value)
            .map_err(|e| ProtocolError::Decode(format!("{}: {}", tag, e)))
    }
}
