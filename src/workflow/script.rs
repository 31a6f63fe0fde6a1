//! Batch edits for the workflow canvas, read from JSON.
//!
//! ```json
//! [
//!   { "op": "add", "kind": "start" },
//!   { "op": "add", "kind": "branch", "name": "金额判断" },
//!   { "op": "add_in_lane", "branch": "node-2", "lane": 0, "kind": "approval" },
//!   { "op": "branch_count", "branch": "node-2", "count": 3 }
//! ]
//! ```

use super::graph::{NodeKind, WorkflowGraph};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphCommand {
    Add {
        kind: NodeKind,
        #[serde(default)]
        name: Option<String>,
    },
    AddInLane {
        branch: String,
        lane: usize,
        kind: NodeKind,
        #[serde(default)]
        name: Option<String>,
    },
    BranchCount {
        branch: String,
        count: usize,
    },
    Delete {
        node: String,
    },
    Rename {
        node: String,
        name: String,
    },
}

impl GraphCommand {
    /// Applies the command and returns the ids it created or removed.
    pub fn apply(&self, graph: &mut WorkflowGraph) -> Result<Vec<String>, GraphError> {
        match self {
            GraphCommand::Add { kind, name } => {
                graph.add_node(*kind, name.as_deref()).map(|id| vec![id])
            }
            GraphCommand::AddInLane {
                branch,
                lane,
                kind,
                name,
            } => graph
                .add_node_in_lane(branch, *lane, *kind, name.as_deref())
                .map(|id| vec![id]),
            GraphCommand::BranchCount { branch, count } => graph.apply_branch_count(branch, *count),
            GraphCommand::Delete { node } => graph.delete_node(node),
            GraphCommand::Rename { node, name } => graph.rename(node, name).map(|_| Vec::new()),
        }
    }
}

/// Runs commands in order, stopping at the first failure.
/// On failure the error carries the index of the failing command.
pub fn apply_script(
    graph: &mut WorkflowGraph,
    commands: &[GraphCommand],
) -> Result<(), (usize, GraphError)> {
    for (index, command) in commands.iter().enumerate() {
        command.apply(graph).map_err(|e| (index, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_from_json() {
        let commands: Vec<GraphCommand> = serde_json::from_str(
            r#"[
                {"op": "add", "kind": "start"},
                {"op": "add", "kind": "branch"},
                {"op": "add_in_lane", "branch": "node-2", "lane": 1, "kind": "cc", "name": "抄送财务"},
                {"op": "delete", "node": "node-1"}
            ]"#,
        )
        .unwrap();
        let mut graph = WorkflowGraph::new();
        apply_script(&mut graph, &commands).unwrap();
        assert_eq!(graph.items().len(), 1);
        assert_eq!(graph.find("node-6").unwrap().name, "抄送财务");
    }

    #[test]
    fn failure_reports_command_index() {
        let commands = vec![
            GraphCommand::Add {
                kind: NodeKind::Start,
                name: None,
            },
            GraphCommand::Delete {
                node: "merge-1".to_string(),
            },
        ];
        let mut graph = WorkflowGraph::new();
        let (index, error) = apply_script(&mut graph, &commands).unwrap_err();
        assert_eq!(index, 1);
        assert_eq!(error, GraphError::NodeNotFound("merge-1".to_string()));
    }
}
