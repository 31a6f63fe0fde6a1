//! The form model: the single source of truth the wizard host owns and the
//! step frames edit through `update_data` messages.

use crate::error::ModelError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod field;
pub mod ids;
pub mod kind;
pub mod logic;
pub mod publish;
pub mod style;

pub use field::{Field, FieldPatch, FieldValidation};
pub use ids::IdGenerator;
pub use kind::FieldKind;
pub use logic::{ActionKind, LogicRule, Operator, RuleAction, RuleCondition, RuleDraft};
pub use publish::{AfterSubmitAction, FormScope, FormStatus, PublishSettings, ValidityType};
pub use style::{FormStyle, contrast_color};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfo {
    pub form_name: String,
    pub form_type: String,
    pub form_category: String,
    pub form_description: String,
    pub enable_version_control: bool,
}

impl Default for BasicInfo {
    fn default() -> Self {
        Self {
            form_name: String::new(),
            form_type: String::new(),
            form_category: String::new(),
            form_description: String::new(),
            enable_version_control: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormModel {
    pub title: String,
    pub description: String,
    pub basic_info: BasicInfo,
    /// Fields laid out in the field-list step, ordered by `Field::order`.
    pub fields: Vec<Field>,
    /// Controls placed on the designer canvas, in canvas order.
    pub controls: Vec<Field>,
    pub style: FormStyle,
    pub logic_rules: Vec<LogicRule>,
    pub publish_settings: PublishSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// Sections this crate does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    ids: IdGenerator,
}

fn decode_section<T: serde::de::DeserializeOwned>(
    section: &str,
    data: Value,
) -> Result<T, ModelError> {
    serde_json::from_value(data).map_err(|e| ModelError::InvalidSection {
        section: section.to_string(),
        message: e.to_string(),
    })
}

impl FormModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// `model[section] = data`. Last write wins; unknown sections are stored as-is.
    pub fn apply_section(&mut self, section: &str, data: Value) -> Result<(), ModelError> {
        match section {
            "title" => self.title = decode_section(section, data)?,
            "description" => self.description = decode_section(section, data)?,
            "basicInfo" => self.basic_info = decode_section(section, data)?,
            "fields" => self.fields = decode_section(section, data)?,
            "controls" => self.controls = decode_section(section, data)?,
            "style" => self.style = decode_section(section, data)?,
            "logicRules" => self.logic_rules = decode_section(section, data)?,
            "publishSettings" => self.publish_settings = decode_section(section, data)?,
            "updateTime" => self.update_time = decode_section(section, data)?,
            other => {
                self.extra.insert(other.to_string(), data);
            }
        }
        Ok(())
    }

    /// Reads one section back as JSON.
    pub fn section(&self, section: &str) -> Option<Value> {
        let value = match section {
            "title" => serde_json::to_value(&self.title),
            "description" => serde_json::to_value(&self.description),
            "basicInfo" => serde_json::to_value(&self.basic_info),
            "fields" => serde_json::to_value(&self.fields),
            "controls" => serde_json::to_value(&self.controls),
            "style" => serde_json::to_value(&self.style),
            "logicRules" => serde_json::to_value(&self.logic_rules),
            "publishSettings" => serde_json::to_value(&self.publish_settings),
            "updateTime" => serde_json::to_value(&self.update_time),
            other => return self.extra.get(other).cloned(),
        };
        value.ok()
    }

    pub fn find_field(&self, field_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Fields in display order.
    pub fn sorted_fields(&self) -> Vec<&Field> {
        self.fields.iter().sorted_by_key(|f| f.order).collect()
    }

    /// Appends a field of `kind` with default label, placeholder and options.
    pub fn add_field(&mut self, kind: FieldKind) -> String {
        let fields = &self.fields;
        let id = self
            .ids
            .next_id("field", '_', |candidate| fields.iter().any(|f| f.id == candidate));
        let mut field = Field::new(id.clone(), kind);
        // Orders pushed by a frame can sit at the top of the range.
        if self.fields.iter().any(|f| f.order == i32::MAX) {
            self.compact_orders();
        }
        field.order = self
            .fields
            .iter()
            .map(|f| f.order.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.fields.push(field);
        tracing::debug!(field_id = %id, "added field");
        id
    }

    pub fn update_field(&mut self, field_id: &str, patch: FieldPatch) -> Result<(), ModelError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| ModelError::FieldNotFound(field_id.to_string()))?;
        patch.apply_to(field);
        Ok(())
    }

    /// Swaps the field's `order` with its predecessor in display order.
    /// Returns `Ok(false)` when the field is already first.
    pub fn move_field_up(&mut self, field_id: &str) -> Result<bool, ModelError> {
        self.swap_with_neighbour(field_id, -1)
    }

    /// Swaps the field's `order` with its successor in display order.
    pub fn move_field_down(&mut self, field_id: &str) -> Result<bool, ModelError> {
        self.swap_with_neighbour(field_id, 1)
    }

    fn swap_with_neighbour(&mut self, field_id: &str, step: isize) -> Result<bool, ModelError> {
        if !self.fields.iter().any(|f| f.id == field_id) {
            return Err(ModelError::FieldNotFound(field_id.to_string()));
        }
        // Duplicate orders would make the swap a no-op.
        if !self.fields.iter().map(|f| f.order).all_unique() {
            self.compact_orders();
        }
        self.sort_fields();

        let Some(position) = self.fields.iter().position(|f| f.id == field_id) else {
            return Err(ModelError::FieldNotFound(field_id.to_string()));
        };
        let Some(neighbour) = position
            .checked_add_signed(step)
            .filter(|n| *n < self.fields.len())
        else {
            return Ok(false);
        };

        let own_order = self.fields[position].order;
        self.fields[position].order = self.fields[neighbour].order;
        self.fields[neighbour].order = own_order;
        self.sort_fields();
        Ok(true)
    }

    /// Removes a field, renumbers the rest to `0..n-1` in display order and
    /// drops the logic rules that pointed at it.
    pub fn delete_field(&mut self, field_id: &str) -> Result<Field, ModelError> {
        let position = self
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| ModelError::FieldNotFound(field_id.to_string()))?;
        let removed = self.fields.remove(position);
        self.compact_orders();

        let before = self.logic_rules.len();
        self.logic_rules.retain(|rule| !rule.references(field_id));
        let dropped = before - self.logic_rules.len();
        if dropped > 0 {
            tracing::debug!(field_id, dropped, "dropped logic rules of deleted field");
        }
        Ok(removed)
    }

    fn sort_fields(&mut self) {
        self.fields.sort_by_key(|f| f.order);
    }

    fn compact_orders(&mut self) {
        self.sort_fields();
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order = index as i32;
        }
    }

    /// Fields that can be used in a logic rule.
    pub fn rule_fields(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| f.kind.is_rule_target())
            .collect()
    }

    /// Validates a rule draft and inserts it, or replaces the rule `editing`.
    pub fn save_logic_rule(
        &mut self,
        draft: RuleDraft,
        editing: Option<&str>,
    ) -> Result<String, ModelError> {
        draft.check().map_err(ModelError::InvalidRule)?;
        for field_id in [&draft.condition_field, &draft.target_field] {
            if !self.rule_fields().iter().any(|f| &f.id == field_id) {
                return Err(ModelError::InvalidRule(format!(
                    "field '{}' does not exist or cannot be used in rules",
                    field_id
                )));
            }
        }

        match editing {
            Some(rule_id) => {
                let slot = self
                    .logic_rules
                    .iter_mut()
                    .find(|r| r.id == rule_id)
                    .ok_or_else(|| ModelError::RuleNotFound(rule_id.to_string()))?;
                *slot = draft.into_rule(rule_id.to_string());
                Ok(rule_id.to_string())
            }
            None => {
                let rules = &self.logic_rules;
                let id = self
                    .ids
                    .next_id("rule", '_', |candidate| rules.iter().any(|r| r.id == candidate));
                self.logic_rules.push(draft.into_rule(id.clone()));
                Ok(id)
            }
        }
    }

    pub fn delete_logic_rule(&mut self, rule_id: &str) -> Result<LogicRule, ModelError> {
        let position = self
            .logic_rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| ModelError::RuleNotFound(rule_id.to_string()))?;
        Ok(self.logic_rules.remove(position))
    }

    /// Rules pointing at fields that no longer exist.
    pub fn dangling_rules(&self) -> Vec<&LogicRule> {
        self.logic_rules
            .iter()
            .filter(|rule| {
                self.find_field(&rule.condition.field_id).is_none()
                    || self.find_field(&rule.action.field_id).is_none()
            })
            .collect()
    }

    /// Human-readable one-line summary of a rule.
    pub fn describe_rule(&self, rule: &LogicRule) -> String {
        let label = |id: &str| {
            self.find_field(id)
                .map(|f| f.label.clone())
                .unwrap_or_else(|| "未知字段".to_string())
        };
        let mut text = format!(
            "当 {} {}",
            label(&rule.condition.field_id),
            rule.condition.operator.label()
        );
        if !rule.condition.value.is_empty() {
            text.push_str(&format!(" {}", rule.condition.value));
        }
        text.push_str(&format!(
            " → {} {}",
            rule.action.kind.label(),
            label(&rule.action.field_id)
        ));
        if let Some(value) = &rule.action.value {
            text.push_str(&format!(" 值为 {}", value));
        }
        text
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_model_serializes_every_section() {
        let value = serde_json::to_value(FormModel::default()).unwrap();
        assert_eq!(value["fields"], json!([]));
        assert_eq!(value["controls"], json!([]));
        assert_eq!(value["style"]["template"], "default");
        assert_eq!(value["publishSettings"]["formStatus"], "draft");
        assert!(value.get("updateTime").is_none());
    }

    #[test]
    fn unknown_sections_are_echoed() {
        let mut model = FormModel::default();
        model
            .apply_section("styleInfo", json!({"primaryColor": "#000"}))
            .unwrap();
        assert_eq!(
            model.section("styleInfo"),
            Some(json!({"primaryColor": "#000"}))
        );
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["styleInfo"]["primaryColor"], "#000");
    }

    #[test]
    fn malformed_known_section_is_rejected() {
        let mut model = FormModel::default();
        let err = model.apply_section("fields", json!("nope")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidSection { ref section, .. } if section == "fields"));
        assert!(model.fields.is_empty());
    }

    #[test]
    fn ids_skip_fields_received_from_frames() {
        let mut model = FormModel::default();
        model
            .apply_section(
                "fields",
                json!([{"id": "field_1", "type": "text", "order": 0}]),
            )
            .unwrap();
        assert_eq!(model.add_field(FieldKind::Number), "field_2");
    }

    #[test]
    fn duplicate_orders_are_repaired_before_moving() {
        let mut model = FormModel::default();
        let a = model.add_field(FieldKind::Text);
        let b = model.add_field(FieldKind::Text);
        for field in &mut model.fields {
            field.order = 7;
        }
        assert!(model.move_field_up(&b).unwrap());
        let orders: Vec<_> = model.sorted_fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(orders, vec![b, a]);
    }
}
