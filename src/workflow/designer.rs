use super::graph::{NodeKind, WorkflowGraph};
use super::properties::{NodeConfig, NodeProperties};
use crate::config::DesignerConfig;
use crate::error::GraphError;
use crate::notice::{NoticeBoard, NoticeKind};
use crate::storage::{KeyValueStore, load_json, save_json};
use serde::{Deserialize, Serialize};

/// Workflow-level settings from the basic-info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub workflow_type: String,
    pub status: String,
}

impl Default for WorkflowInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            workflow_type: String::new(),
            status: "draft".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
}

/// Snapshot produced by a save: the workflow settings plus every node in canvas order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(flatten)]
    pub info: WorkflowInfo,
    pub nodes: Vec<NodeSummary>,
}

/// The workflow editor page: the canvas, the selected node's property panel
/// and the per-node property store.
pub struct WorkflowDesigner<S: KeyValueStore> {
    graph: WorkflowGraph,
    store: S,
    config: DesignerConfig,
    info: WorkflowInfo,
    selected: Option<String>,
    notices: NoticeBoard,
    now_ms: u64,
}

impl<S: KeyValueStore> WorkflowDesigner<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(&DesignerConfig::default(), store)
    }

    pub fn with_config(config: &DesignerConfig, store: S) -> Self {
        Self {
            graph: WorkflowGraph::new(),
            store,
            config: config.clone(),
            info: WorkflowInfo::default(),
            selected: None,
            notices: NoticeBoard::new(config.timing.notice_duration_ms),
            now_ms: 0,
        }
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn info(&self) -> &WorkflowInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut WorkflowInfo {
        &mut self.info
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Lets banners time out.
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.now_ms += elapsed_ms;
        self.notices.expire(self.now_ms);
    }

    fn report<T>(&mut self, result: Result<T, GraphError>) -> Result<T, GraphError> {
        if let Err(e) = &result {
            self.notices.show(NoticeKind::Error, e.to_string(), self.now_ms);
        }
        result
    }

    fn succeed(&mut self, message: &str) {
        self.notices.show(NoticeKind::Success, message, self.now_ms);
    }

    pub fn add_node(&mut self, kind: NodeKind, name: Option<&str>) -> Result<String, GraphError> {
        let result = self.graph.add_node(kind, name);
        self.report(result)
    }

    pub fn add_node_in_lane(
        &mut self,
        branch_id: &str,
        lane: usize,
        kind: NodeKind,
        name: Option<&str>,
    ) -> Result<String, GraphError> {
        let result = self.graph.add_node_in_lane(branch_id, lane, kind, name);
        self.report(result)
    }

    fn purge(&mut self, node_ids: &[String]) {
        for id in node_ids {
            let key = self.config.node_key(id);
            if let Err(e) = self.store.remove(&key) {
                tracing::warn!(node_id = %id, error = %e, "stale node properties not removed");
            }
            if self.selected.as_deref() == Some(id.as_str()) {
                self.selected = None;
            }
        }
    }

    /// Deletes a node (a branch node takes its whole block with it) and the
    /// stored properties of everything removed.
    pub fn delete_node(&mut self, node_id: &str) -> Result<Vec<String>, GraphError> {
        let result = self.graph.delete_node(node_id);
        let removed = self.report(result)?;
        self.purge(&removed);
        self.succeed("node deleted");
        Ok(removed)
    }

    pub fn apply_branch_count(&mut self, branch_id: &str, count: usize) -> Result<(), GraphError> {
        let result = self.graph.apply_branch_count(branch_id, count);
        let removed = self.report(result)?;
        self.purge(&removed);
        Ok(())
    }

    /// Selects a node and returns what its property panel shows.
    pub fn select(&mut self, node_id: &str) -> Result<NodeProperties, GraphError> {
        let result = self.load_properties(node_id);
        let props = self.report(result)?;
        self.selected = Some(node_id.to_string());
        Ok(props)
    }

    /// Saved properties of a node, or its defaults if it was never saved.
    pub fn load_properties(&self, node_id: &str) -> Result<NodeProperties, GraphError> {
        let node = self
            .graph
            .find(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        let stored = match load_json::<NodeProperties>(&self.store, &self.config.node_key(node_id)) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(node_id, error = %e, "stored properties unreadable, using defaults");
                None
            }
        };
        match stored {
            Some(props) if props.kind() == node.kind => Ok(NodeProperties {
                name: node.name.clone(),
                ..props
            }),
            Some(_) => {
                tracing::warn!(node_id, "stored properties belong to another node type");
                Ok(NodeProperties::defaults(node_id, node.kind, node.name.clone()))
            }
            None => {
                let mut props = NodeProperties::defaults(node_id, node.kind, node.name.clone());
                props.description = node.description.clone();
                if let (NodeConfig::Branch(branch), Some(block)) =
                    (&mut props.config, self.graph.branch(node_id))
                {
                    branch.branch_count = block.lanes.len();
                }
                Ok(props)
            }
        }
    }

    /// Saves the property panel of the selected node.
    ///
    /// Renames the node, applies the branch count for branch nodes and
    /// stores the settings under the node's key.
    pub fn save_properties(&mut self, props: NodeProperties) -> Result<(), GraphError> {
        let result = self.try_save_properties(props);
        self.report(result)?;
        self.succeed("node properties saved");
        Ok(())
    }

    fn try_save_properties(&mut self, mut props: NodeProperties) -> Result<(), GraphError> {
        let node_id = props.id.clone();
        if self.selected.as_deref() != Some(node_id.as_str()) {
            tracing::debug!(node_id = %node_id, "saving properties of an unselected node");
        }
        let kind = self
            .graph
            .find(&node_id)
            .map(|n| n.kind)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        props.name = props.name.trim().to_string();
        if props.name.is_empty() {
            return Err(GraphError::EmptyName);
        }
        if props.kind() != kind {
            return Err(GraphError::InvalidProperties {
                node_id,
                message: format!("expected {} settings, got {}", kind, props.kind()),
            });
        }
        props.check().map_err(|message| GraphError::InvalidProperties {
            node_id: node_id.clone(),
            message,
        })?;

        // Stored first: a failed write leaves the canvas untouched.
        let key = self.config.node_key(&node_id);
        save_json(&mut self.store, &key, &props)?;
        self.graph.rename(&node_id, &props.name)?;
        if let Some(node) = self.graph.find_mut(&node_id) {
            node.description = props.description.clone();
        }
        if let NodeConfig::Branch(branch) = &props.config {
            let removed = self.graph.apply_branch_count(&node_id, branch.branch_count)?;
            self.purge(&removed);
        }
        tracing::debug!(node_id = %node_id, "node properties saved");
        Ok(())
    }

    fn snapshot(&self) -> WorkflowDocument {
        WorkflowDocument {
            info: self.info.clone(),
            nodes: self
                .graph
                .nodes()
                .into_iter()
                .map(|n| NodeSummary {
                    id: n.id.clone(),
                    kind: n.kind,
                    name: n.name.clone(),
                })
                .collect(),
        }
    }

    pub fn save_as_draft(&mut self) -> Result<WorkflowDocument, GraphError> {
        if self.info.name.trim().is_empty() {
            return self.report(Err(GraphError::MissingWorkflowName));
        }
        let document = self.snapshot();
        tracing::info!(name = %document.info.name, nodes = document.nodes.len(), "workflow saved");
        self.succeed("workflow saved");
        Ok(document)
    }

    /// Saves the workflow after checking it has a start node and at least
    /// one other node.
    pub fn publish(&mut self) -> Result<WorkflowDocument, GraphError> {
        let check = if self.graph.node_count() < 2 {
            Err(GraphError::PublishRejected(
                "a workflow needs a start node and at least one other node".to_string(),
            ))
        } else if !self.graph.has_kind(NodeKind::Start) {
            Err(GraphError::PublishRejected(
                "a workflow must contain a start node".to_string(),
            ))
        } else {
            Ok(())
        };
        self.report(check)?;

        let previous = std::mem::replace(&mut self.info.status, "published".to_string());
        match self.save_as_draft() {
            Ok(document) => {
                self.succeed("workflow published");
                Ok(document)
            }
            Err(e) => {
                self.info.status = previous;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    #[test]
    fn unsaved_branch_reports_its_lane_count() {
        let mut designer = WorkflowDesigner::new(MemoryStore::new());
        let branch = designer.add_node(NodeKind::Branch, None).unwrap();
        designer.apply_branch_count(&branch, 3).unwrap();
        let props = designer.select(&branch).unwrap();
        let NodeConfig::Branch(config) = props.config else {
            panic!("expected branch settings");
        };
        assert_eq!(config.branch_count, 3);
    }

    #[test]
    fn unreadable_properties_fall_back_to_defaults() {
        let mut designer = WorkflowDesigner::new(MemoryStore::new());
        let id = designer.add_node(NodeKind::Task, Some("补充材料")).unwrap();
        designer
            .store
            .set("workflow_node_node-1", "{not json".to_string())
            .unwrap();
        let props = designer.select(&id).unwrap();
        assert_eq!(props.name, "补充材料");
        assert_eq!(props.config, NodeConfig::default_for(NodeKind::Task));
        assert_eq!(designer.selected(), Some(id.as_str()));

        // Saving again repairs the entry.
        designer.save_properties(props).unwrap();
        assert!(designer.load_properties(&id).is_ok());
    }

    /// Accepts reads, refuses every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }
        fn set(&mut self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Io("storage is full".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_the_canvas_unchanged() {
        let mut designer = WorkflowDesigner::new(ReadOnlyStore);
        let branch = designer.add_node(NodeKind::Branch, Some("金额判断")).unwrap();
        let mut props = designer.select(&branch).unwrap();
        props.name = "新名称".to_string();
        if let NodeConfig::Branch(config) = &mut props.config {
            config.branch_count = 4;
        }
        assert!(matches!(
            designer.save_properties(props),
            Err(GraphError::Storage(_))
        ));
        let block = designer.graph().branch(&branch).unwrap();
        assert_eq!(block.branch.name, "金额判断");
        assert_eq!(block.lanes.len(), 2);
    }

    #[test]
    fn failed_operations_raise_a_notice() {
        let mut designer = WorkflowDesigner::new(MemoryStore::new());
        assert!(designer.delete_node("node-9").is_err());
        assert_eq!(designer.notices().last_error(), Some("Node 'node-9' not found on the canvas"));
        designer.advance(3000);
        assert!(designer.notices().visible().is_empty());
    }
}
