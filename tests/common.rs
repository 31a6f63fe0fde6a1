//! Common test utilities for building wizards, models and workflows.
use sekkei::prelude::*;

/// A wizard on step 1 whose frame has finished loading.
#[allow(dead_code)]
pub fn started_wizard() -> WizardHost<RecordingFrameHost> {
    let mut wizard = WizardHost::new(RecordingFrameHost::new());
    wizard.start().expect("step 1 is in range");
    finish_load(&mut wizard);
    wizard
}

/// Fires the load callback of whatever frame is attached.
#[allow(dead_code)]
pub fn finish_load(wizard: &mut WizardHost<RecordingFrameHost>) {
    if let Some(frame) = wizard.current_frame() {
        wizard.on_frame_loaded(frame);
    }
}

/// A model that passes every default step validator.
///
/// Fields: `field_1` (text, "姓名"), `field_2` (select, "部门").
#[allow(dead_code)]
pub fn complete_model() -> FormModel {
    let mut model = FormModel::new();
    model.title = "员工信息登记".to_string();
    let name = model.add_field(FieldKind::Text);
    model
        .update_field(
            &name,
            FieldPatch {
                label: Some("姓名".to_string()),
                required: Some(true),
                ..FieldPatch::default()
            },
        )
        .expect("field was just added");
    let dept = model.add_field(FieldKind::Select);
    model
        .update_field(
            &dept,
            FieldPatch {
                label: Some("部门".to_string()),
                ..FieldPatch::default()
            },
        )
        .expect("field was just added");
    model
}

/// Start, a two-lane branch with one approval in lane 0, then End.
///
/// Ids: `node-1` start, `node-2` branch, `branch-sub-node-3`/`-4` conditions,
/// `merge-5`, `node-6` approval, `node-7` end.
#[allow(dead_code)]
pub fn sample_workflow() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    graph.add_node(NodeKind::Start, Some("提交申请")).unwrap();
    let branch = graph.add_node(NodeKind::Branch, Some("金额判断")).unwrap();
    graph
        .add_node_in_lane(&branch, 0, NodeKind::Approval, Some("经理审批"))
        .unwrap();
    graph.add_node(NodeKind::End, None).unwrap();
    graph
}

/// Messages the wizard posted to its frames, oldest first.
#[allow(dead_code)]
pub fn sent_kinds(wizard: &WizardHost<RecordingFrameHost>) -> Vec<&'static str> {
    wizard.frames().sent().iter().map(|(_, m)| m.kind()).collect()
}
