//! Workflow designer tests: canvas editing, node properties and publishing.
mod common;
use common::*;
use sekkei::notice::NoticeKind;
use sekkei::prelude::*;
use sekkei::workflow::NodeConfig;
use sekkei::workflow::properties::{AssigneeMode, AutoProcess, BranchConfig};

fn designer() -> WorkflowDesigner<MemoryStore> {
    WorkflowDesigner::new(MemoryStore::new())
}

#[cfg(test)]
mod graph_tests {
    use super::*;

    #[test]
    fn test_connections_follow_layout() {
        let graph = sample_workflow();
        let edges: Vec<(String, String)> = graph
            .connections()
            .into_iter()
            .map(|c| (c.from, c.to))
            .collect();
        let expected = [
            ("node-1", "node-2"),
            ("node-2", "branch-sub-node-3"),
            ("branch-sub-node-3", "node-6"),
            ("node-6", "merge-5"),
            ("node-2", "branch-sub-node-4"),
            ("branch-sub-node-4", "merge-5"),
            ("merge-5", "node-7"),
        ];
        assert_eq!(edges.len(), expected.len());
        for (from, to) in expected {
            assert!(
                edges.contains(&(from.to_string(), to.to_string())),
                "missing edge {} -> {}",
                from,
                to
            );
        }
    }

    #[test]
    fn test_deleting_branch_removes_its_block() {
        let mut graph = sample_workflow();
        let mut removed = graph.delete_node("node-2").unwrap();
        removed.sort();
        assert_eq!(
            removed,
            vec!["branch-sub-node-3", "branch-sub-node-4", "merge-5", "node-2", "node-6"]
        );
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn test_condition_and_merge_are_protected() {
        let mut graph = sample_workflow();
        for id in ["branch-sub-node-3", "merge-5"] {
            assert!(matches!(
                graph.delete_node(id),
                Err(GraphError::ProtectedNode { .. })
            ));
        }
        assert_eq!(graph.node_count(), 7);
    }

    #[test]
    fn test_ids_are_never_reused_after_delete() {
        let mut graph = sample_workflow();
        graph.delete_node("node-7").unwrap();
        assert_eq!(graph.add_node(NodeKind::End, None).unwrap(), "node-8");
    }

    #[test]
    fn test_graph_round_trips_through_json() {
        let graph = sample_workflow();
        let json = serde_json::to_string(&graph).unwrap();
        let mut restored: WorkflowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.nodes(), graph.nodes());
        // A restored canvas must not hand out ids that are already on it.
        let id = restored.add_node(NodeKind::Cc, None).unwrap();
        assert!(graph.find(&id).is_none());
    }
}

#[cfg(test)]
mod designer_tests {
    use super::*;

    #[test]
    fn test_unsaved_node_shows_defaults() {
        let mut designer = designer();
        let id = designer.add_node(NodeKind::Approval, None).unwrap();
        let props = designer.select(&id).unwrap();
        assert_eq!(props.name, "审批节点");
        let NodeConfig::Approval(approval) = props.config else {
            panic!("expected approval settings");
        };
        assert_eq!(approval.approval_actions, vec!["agree", "reject"]);
        assert_eq!(designer.selected(), Some(id.as_str()));
    }

    #[test]
    fn test_saved_properties_are_restored() {
        let mut designer = designer();
        let id = designer.add_node(NodeKind::Approval, None).unwrap();
        let mut props = designer.select(&id).unwrap();
        props.name = "  部门经理审批 ".to_string();
        if let NodeConfig::Approval(approval) = &mut props.config {
            approval.approvers.mode = AssigneeMode::Role;
            approval.approvers.values = vec!["manager".to_string()];
            approval.approval_deadline = Some(3);
        }
        designer.save_properties(props).unwrap();

        assert_eq!(designer.graph().find(&id).unwrap().name, "部门经理审批");
        assert!(designer.store().get("workflow_node_node-1").is_some());
        let reloaded = designer.load_properties(&id).unwrap();
        let NodeConfig::Approval(approval) = reloaded.config else {
            panic!("expected approval settings");
        };
        assert_eq!(approval.approvers.mode, AssigneeMode::Role);
        assert_eq!(approval.approval_deadline, Some(3));
        assert_eq!(
            designer.notices().current(NoticeKind::Success).map(|n| n.message.as_str()),
            Some("node properties saved")
        );
    }

    #[test]
    fn test_invalid_properties_are_rejected() {
        let mut designer = designer();
        let id = designer.add_node(NodeKind::Approval, None).unwrap();

        let mut props = designer.select(&id).unwrap();
        props.name = "   ".to_string();
        assert_eq!(designer.save_properties(props), Err(GraphError::EmptyName));

        let mut props = designer.select(&id).unwrap();
        if let NodeConfig::Approval(approval) = &mut props.config {
            approval.auto_process = AutoProcess::AutoForward;
        }
        assert!(matches!(
            designer.save_properties(props),
            Err(GraphError::InvalidProperties { .. })
        ));

        let wrong_kind = NodeProperties::defaults(id.clone(), NodeKind::Cc, "抄送");
        assert!(matches!(
            designer.save_properties(wrong_kind),
            Err(GraphError::InvalidProperties { .. })
        ));
        assert!(designer.store().get("workflow_node_node-1").is_none());
        assert!(designer.notices().last_error().is_some());
    }

    #[test]
    fn test_branch_count_from_properties() {
        let mut designer = designer();
        let branch = designer.add_node(NodeKind::Branch, None).unwrap();
        let mut props = designer.select(&branch).unwrap();
        props.config = NodeConfig::Branch(BranchConfig {
            branch_count: 4,
            ..BranchConfig::default()
        });
        designer.save_properties(props).unwrap();
        assert_eq!(designer.graph().branch(&branch).unwrap().lanes.len(), 4);

        let mut props = designer.select(&branch).unwrap();
        props.config = NodeConfig::Branch(BranchConfig {
            branch_count: 11,
            ..BranchConfig::default()
        });
        assert!(designer.save_properties(props).is_err());
        assert_eq!(designer.graph().branch(&branch).unwrap().lanes.len(), 4);
    }

    #[test]
    fn test_removed_nodes_lose_their_stored_properties() {
        let mut designer = designer();
        let branch = designer.add_node(NodeKind::Branch, None).unwrap();
        designer.apply_branch_count(&branch, 3).unwrap();
        let lane_node = designer
            .add_node_in_lane(&branch, 2, NodeKind::Task, Some("补充材料"))
            .unwrap();
        let props = designer.select(&lane_node).unwrap();
        designer.save_properties(props).unwrap();
        let key = format!("workflow_node_{}", lane_node);
        assert!(designer.store().get(&key).is_some());

        designer.apply_branch_count(&branch, 2).unwrap();
        assert!(designer.graph().find(&lane_node).is_none());
        assert!(designer.store().get(&key).is_none());
        assert_eq!(designer.selected(), None);

        let props = designer.select(&branch).unwrap();
        designer.save_properties(props).unwrap();
        designer.delete_node(&branch).unwrap();
        assert!(designer.store().is_empty());
        assert!(designer.graph().is_empty());
    }
}

#[cfg(test)]
mod publish_tests {
    use super::*;

    #[test]
    fn test_draft_needs_a_name() {
        let mut designer = designer();
        designer.add_node(NodeKind::Start, None).unwrap();
        assert_eq!(designer.save_as_draft(), Err(GraphError::MissingWorkflowName));
        designer.info_mut().name = "采购审批".to_string();
        let document = designer.save_as_draft().unwrap();
        assert_eq!(document.info.status, "draft");
        assert_eq!(document.nodes.len(), 1);
    }

    #[test]
    fn test_publish_requires_start_and_another_node() {
        let mut designer = designer();
        designer.info_mut().name = "采购审批".to_string();
        assert!(matches!(designer.publish(), Err(GraphError::PublishRejected(_))));

        designer.add_node(NodeKind::Approval, None).unwrap();
        designer.add_node(NodeKind::End, None).unwrap();
        let Err(GraphError::PublishRejected(reason)) = designer.publish() else {
            panic!("a workflow without a start node must not publish");
        };
        assert!(reason.contains("start node"));
        assert_eq!(designer.info().status, "draft");
    }

    #[test]
    fn test_publish_snapshots_nodes_in_canvas_order() {
        let mut designer = designer();
        designer.info_mut().name = "报销审批".to_string();
        designer.add_node(NodeKind::Start, Some("提交报销")).unwrap();
        let branch = designer.add_node(NodeKind::Branch, None).unwrap();
        designer
            .add_node_in_lane(&branch, 1, NodeKind::Approval, Some("财务审批"))
            .unwrap();
        designer.add_node(NodeKind::End, None).unwrap();

        let document = designer.publish().unwrap();
        assert_eq!(designer.info().status, "published");
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["status"], "published");
        assert_eq!(value["name"], "报销审批");
        let kinds: Vec<&str> = value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["type"].as_str().unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec!["start", "branch", "condition", "condition", "approval", "merge", "end"]
        );
    }
}
