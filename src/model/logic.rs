use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Lt,
    Contains,
    Empty,
    NotEmpty,
}

impl Operator {
    /// Whether the operator compares against a user-supplied value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::Empty | Operator::NotEmpty)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "等于",
            Operator::Neq => "不等于",
            Operator::Gt => "大于",
            Operator::Lt => "小于",
            Operator::Contains => "包含",
            Operator::Empty => "为空",
            Operator::NotEmpty => "不为空",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Show,
    Hide,
    Required,
    ReadOnly,
    SetValue,
    Disable,
    Enable,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Show => "显示",
            ActionKind::Hide => "隐藏",
            ActionKind::Required => "设为必填",
            ActionKind::ReadOnly => "设为只读",
            ActionKind::SetValue => "设置值",
            ActionKind::Disable => "禁用",
            ActionKind::Enable => "启用",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub field_id: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub field_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// "When field X matches, do Y to field Z."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicRule {
    pub id: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
}

impl LogicRule {
    pub fn references(&self, field_id: &str) -> bool {
        self.condition.field_id == field_id || self.action.field_id == field_id
    }
}

/// Raw input from the rule editor, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub condition_field: String,
    pub operator: Operator,
    pub condition_value: String,
    pub action: ActionKind,
    pub target_field: String,
    pub set_value: String,
}

impl RuleDraft {
    pub fn new(
        condition_field: impl Into<String>,
        operator: Operator,
        action: ActionKind,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            condition_field: condition_field.into(),
            operator,
            condition_value: String::new(),
            action,
            target_field: target_field.into(),
            set_value: String::new(),
        }
    }

    pub fn with_condition_value(mut self, value: impl Into<String>) -> Self {
        self.condition_value = value.into();
        self
    }

    pub fn with_set_value(mut self, value: impl Into<String>) -> Self {
        self.set_value = value.into();
        self
    }

    /// Checks the draft is complete. Field existence is checked by the model.
    pub fn check(&self) -> Result<(), String> {
        if self.condition_field.is_empty() {
            return Err("please choose a condition field".to_string());
        }
        if self.target_field.is_empty() {
            return Err("please choose a target field".to_string());
        }
        if self.operator.takes_value() && self.condition_value.is_empty() {
            return Err("please enter a condition value".to_string());
        }
        if self.action == ActionKind::SetValue && self.set_value.is_empty() {
            return Err("please enter the value to set".to_string());
        }
        Ok(())
    }

    pub(crate) fn into_rule(self, id: String) -> LogicRule {
        let value = if self.operator.takes_value() {
            self.condition_value
        } else {
            String::new()
        };
        let action_value = (self.action == ActionKind::SetValue).then_some(self.set_value);
        LogicRule {
            id,
            condition: RuleCondition {
                field_id: self.condition_field,
                operator: self.operator,
                value,
            },
            action: RuleAction {
                kind: self.action,
                field_id: self.target_field,
                value: action_value,
            },
        }
    }
}
