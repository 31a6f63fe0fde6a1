//! Per-node settings edited in the property panel.
//!
//! Stored as one flat JSON object per node: the common `id`, `type`, `name`
//! and `description` keys plus the keys of the node type's own settings.

use super::graph::NodeKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperties {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Also carries the `type` key.
    #[serde(flatten)]
    pub config: NodeConfig,
}

impl NodeProperties {
    /// Default settings for a node that was never saved.
    pub fn defaults(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            config: NodeConfig::default_for(kind),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.config.kind()
    }

    /// Checks settings that cannot be expressed in the types.
    pub fn check(&self) -> Result<(), String> {
        match &self.config {
            NodeConfig::Approval(approval) => {
                if approval.auto_process == AutoProcess::AutoForward
                    && approval.forward_persons.as_deref().is_none_or(str::is_empty)
                {
                    return Err("auto-forward needs at least one forward person".to_string());
                }
                approval.attached_form.as_ref().map_or(Ok(()), AttachedForm::check)
            }
            NodeConfig::Task(task) => task.attached_form.as_ref().map_or(Ok(()), AttachedForm::check),
            NodeConfig::Branch(branch) => {
                if !(2..=10).contains(&branch.branch_count) {
                    return Err(format!(
                        "branch count must be between 2 and 10, got {}",
                        branch.branch_count
                    ));
                }
                Ok(())
            }
            NodeConfig::Business(business) => business.check(),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeConfig {
    Start(StartConfig),
    Approval(ApprovalConfig),
    Task(TaskConfig),
    Cc(CcConfig),
    Branch(BranchConfig),
    Merge(MergeConfig),
    Condition,
    Business(BusinessConfig),
    Ai(AiConfig),
    Data,
    Macro,
    End,
}

impl NodeConfig {
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodeConfig::Start(StartConfig::default()),
            NodeKind::Approval => NodeConfig::Approval(ApprovalConfig::default()),
            NodeKind::Task => NodeConfig::Task(TaskConfig::default()),
            NodeKind::Cc => NodeConfig::Cc(CcConfig::default()),
            NodeKind::Branch => NodeConfig::Branch(BranchConfig::default()),
            NodeKind::Merge => NodeConfig::Merge(MergeConfig::default()),
            NodeKind::Condition => NodeConfig::Condition,
            NodeKind::Business => NodeConfig::Business(BusinessConfig::default()),
            NodeKind::Ai => NodeConfig::Ai(AiConfig::default()),
            NodeKind::Data => NodeConfig::Data,
            NodeKind::Macro => NodeConfig::Macro,
            NodeKind::End => NodeConfig::End,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeConfig::Start(_) => NodeKind::Start,
            NodeConfig::Approval(_) => NodeKind::Approval,
            NodeConfig::Task(_) => NodeKind::Task,
            NodeConfig::Cc(_) => NodeKind::Cc,
            NodeConfig::Branch(_) => NodeKind::Branch,
            NodeConfig::Merge(_) => NodeKind::Merge,
            NodeConfig::Condition => NodeKind::Condition,
            NodeConfig::Business(_) => NodeKind::Business,
            NodeConfig::Ai(_) => NodeKind::Ai,
            NodeConfig::Data => NodeKind::Data,
            NodeConfig::Macro => NodeKind::Macro,
            NodeConfig::End => NodeKind::End,
        }
    }
}

/// How the people responsible for a node are picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeMode {
    /// Named people.
    #[default]
    Specified,
    /// Everyone in an org unit.
    Org,
    Role,
    /// A unit of the business structure.
    Business,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignee {
    pub mode: AssigneeMode,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAccess {
    ReadOnly,
    Hidden,
    #[default]
    Editable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPermission {
    pub field: String,
    pub access: FieldAccess,
}

/// A form attached to an approval or task, with per-field access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachedForm {
    pub form_id: String,
    pub field_permissions: Vec<FieldPermission>,
}

impl AttachedForm {
    fn check(&self) -> Result<(), String> {
        if self.form_id.is_empty() {
            return Err("please choose the form to attach".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartConfig {
    /// `all`, `internal` or `external`.
    pub initiator_scope: String,
    pub initiators: Assignee,
    /// Launches allowed per initiator; `-1` means unlimited.
    pub launch_limit: i64,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            initiator_scope: "all".to_string(),
            initiators: Assignee::default(),
            launch_limit: -1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMethod {
    /// Everyone must agree.
    #[default]
    And,
    /// Anyone may decide.
    Or,
    Serial,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoProcess {
    #[default]
    #[serde(rename = "")]
    Off,
    #[serde(rename = "auto-approve")]
    AutoApprove,
    #[serde(rename = "auto-reject")]
    AutoReject,
    #[serde(rename = "auto-forward")]
    AutoForward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApprovalConfig {
    pub approval_method: ApprovalMethod,
    /// Days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_deadline: Option<u32>,
    pub auto_process: AutoProcess,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_persons: Option<String>,
    pub approval_actions: Vec<String>,
    pub approvers: Assignee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_form: Option<AttachedForm>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            approval_method: ApprovalMethod::And,
            approval_deadline: None,
            auto_process: AutoProcess::Off,
            forward_persons: None,
            approval_actions: vec!["agree".to_string(), "reject".to_string()],
            approvers: Assignee::default(),
            attached_form: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_deadline: Option<u32>,
    pub handlers: Assignee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_form: Option<AttachedForm>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CcConfig {
    pub recipients: Assignee,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchCondition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchConfig {
    pub branch_count: usize,
    pub conditions: Vec<BranchCondition>,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            branch_count: 2,
            conditions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeConfig {
    pub merge_method: MergeMethod,
    pub selected_branches: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// `model`, `agent` or `process-agent`.
    pub ai_service: String,
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    #[default]
    Function,
    Interface,
    Data,
    Composite,
}

/// Where a parameter value comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValueBinding {
    pub name: String,
    /// `field`, `constant`, `variable` or `function`.
    pub source: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionConfig {
    pub function_id: String,
    pub expression: String,
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceConfig {
    pub interface_id: String,
    pub method: String,
    pub url: String,
    pub auth_type: String,
    pub params: Vec<ValueBinding>,
    pub headers: Vec<ValueBinding>,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            interface_id: String::new(),
            method: "POST".to_string(),
            url: String::new(),
            auth_type: "none".to_string(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataConfig {
    /// `insert`, `update`, `delete`, `query` or `batch`.
    pub operation: String,
    pub data_source: String,
    pub table: String,
    pub fields: Vec<ValueBinding>,
    pub conditions: Vec<BranchCondition>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            operation: "insert".to_string(),
            data_source: "database".to_string(),
            table: String::new(),
            fields: Vec::new(),
            conditions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositeStep {
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: BusinessType,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositeConfig {
    pub steps: Vec<CompositeStep>,
    pub stop_on_error: bool,
    pub log_execution: bool,
    pub rollback_on_error: bool,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            stop_on_error: true,
            log_execution: false,
            rollback_on_error: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessConfig {
    pub business_type: BusinessType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_config: Option<FunctionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_config: Option<InterfaceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_config: Option<DataConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_config: Option<CompositeConfig>,
}

impl BusinessConfig {
    fn check(&self) -> Result<(), String> {
        let present = match self.business_type {
            BusinessType::Function => self.function_config.is_some(),
            BusinessType::Interface => self.interface_config.is_some(),
            BusinessType::Data => self.data_config.is_some(),
            BusinessType::Composite => self.composite_config.is_some(),
        };
        if !present {
            return Err(format!(
                "business type '{}' has no matching configuration",
                serde_json::to_value(self.business_type)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            ));
        }
        if let Some(interface) = &self.interface_config {
            if self.business_type == BusinessType::Interface
                && interface.url.is_empty()
                && interface.interface_id.is_empty()
            {
                return Err("interface call needs a preset or a URL".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_object_is_flat() {
        let props = NodeProperties::defaults("node-1", NodeKind::Merge, "合并节点");
        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(value["type"], "merge");
        assert_eq!(value["mergeMethod"], "all");
        assert_eq!(value["selectedBranches"], json!([]));
    }

    #[test]
    fn reads_saved_approval() {
        let props: NodeProperties = serde_json::from_value(json!({
            "id": "node-3",
            "type": "approval",
            "name": "经理审批",
            "approvalMethod": "or",
            "autoProcess": "auto-forward",
            "forwardPersons": "张三",
            "approvalActions": ["agree", "return"]
        }))
        .unwrap();
        assert_eq!(props.kind(), NodeKind::Approval);
        let NodeConfig::Approval(approval) = &props.config else {
            panic!("expected approval settings");
        };
        assert_eq!(approval.approval_method, ApprovalMethod::Or);
        assert_eq!(approval.approval_actions, vec!["agree", "return"]);
        assert!(props.check().is_ok());
    }

    #[test]
    fn auto_forward_needs_people() {
        let mut props = NodeProperties::defaults("node-1", NodeKind::Approval, "审批");
        if let NodeConfig::Approval(approval) = &mut props.config {
            approval.auto_process = AutoProcess::AutoForward;
        }
        assert!(props.check().is_err());
    }

    #[test]
    fn business_type_needs_its_config() {
        let mut props = NodeProperties::defaults("node-1", NodeKind::Business, "业务");
        assert!(props.check().is_err());
        if let NodeConfig::Business(business) = &mut props.config {
            business.function_config = Some(FunctionConfig::default());
        }
        assert!(props.check().is_ok());
    }
}
