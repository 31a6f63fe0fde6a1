//! The workflow canvas: a vertical sequence of nodes and branch blocks.

use crate::error::GraphError;
use crate::model::IdGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_BRANCHES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Approval,
    Task,
    Cc,
    Branch,
    Merge,
    Condition,
    Business,
    Ai,
    Data,
    Macro,
    End,
}

impl NodeKind {
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Start,
        NodeKind::Approval,
        NodeKind::Task,
        NodeKind::Cc,
        NodeKind::Branch,
        NodeKind::Merge,
        NodeKind::Condition,
        NodeKind::Business,
        NodeKind::Ai,
        NodeKind::Data,
        NodeKind::Macro,
        NodeKind::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Approval => "approval",
            NodeKind::Task => "task",
            NodeKind::Cc => "cc",
            NodeKind::Branch => "branch",
            NodeKind::Merge => "merge",
            NodeKind::Condition => "condition",
            NodeKind::Business => "business",
            NodeKind::Ai => "ai",
            NodeKind::Data => "data",
            NodeKind::Macro => "macro",
            NodeKind::End => "end",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == tag)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Start => "发起节点",
            NodeKind::Approval => "审批节点",
            NodeKind::Task => "办理节点",
            NodeKind::Cc => "抄送节点",
            NodeKind::Branch => "分支节点",
            NodeKind::Merge => "合并节点",
            NodeKind::Condition => "条件节点",
            NodeKind::Business => "业务节点",
            NodeKind::Ai => "AI节点",
            NodeKind::Data => "数据节点",
            NodeKind::Macro => "宏节点",
            NodeKind::End => "结束节点",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::Start => "▶",
            NodeKind::Approval => "✓",
            NodeKind::Task => "✎",
            NodeKind::Cc => "📧",
            NodeKind::Branch => "↗",
            NodeKind::Merge => "↙",
            NodeKind::Condition => "?",
            NodeKind::Business => "📊",
            NodeKind::Ai => "🤖",
            NodeKind::Data => "💾",
            NodeKind::Macro => "⚙",
            NodeKind::End => "■",
        }
    }

    /// Kinds that only exist as part of a branch block.
    pub fn is_structural(&self) -> bool {
        matches!(self, NodeKind::Condition | NodeKind::Merge)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Node {
    fn new(id: String, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            description: String::new(),
        }
    }

    /// `审批节点: 部门经理审批`
    pub fn full_name(&self) -> String {
        format!("{}: {}", self.kind.display_name(), self.name)
    }
}

/// One path through a branch: its condition followed by the nodes on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub condition: Node,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// A branch node, its lanes and the merge node that joins them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchBlock {
    pub branch: Node,
    pub lanes: Vec<Lane>,
    pub merge: Node,
}

impl BranchBlock {
    fn node_ids(&self) -> Vec<String> {
        let mut ids = vec![self.branch.id.clone()];
        for lane in &self.lanes {
            ids.push(lane.condition.id.clone());
            ids.extend(lane.nodes.iter().map(|n| n.id.clone()));
        }
        ids.push(self.merge.id.clone());
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum CanvasItem {
    Node(Node),
    Branch(BranchBlock),
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

impl Connection {
    fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Where a node sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePosition {
    Item(usize),
    BranchHead(usize),
    Condition { item: usize, lane: usize },
    InLane { item: usize, lane: usize, index: usize },
    Merge(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    items: Vec<CanvasItem>,
    #[serde(skip)]
    ids: IdGenerator,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let taken: Vec<String> = self.nodes().iter().map(|n| n.id.clone()).collect();
        self.ids
            .next_id(prefix, '-', |id| taken.iter().any(|t| t == id))
    }

    fn condition_node(&mut self, index: usize) -> Node {
        let id = self.next_id("branch-sub-node");
        Node::new(id, NodeKind::Condition, format!("条件 {}", index))
    }

    fn branch_block(&mut self, name: String) -> BranchBlock {
        let branch = Node::new(self.next_id("node"), NodeKind::Branch, name);
        let lanes = (1..=MIN_BRANCHES)
            .map(|i| Lane {
                condition: self.condition_node(i),
                nodes: Vec::new(),
            })
            .collect();
        let merge = Node::new(
            self.next_id("merge"),
            NodeKind::Merge,
            NodeKind::Merge.display_name(),
        );
        BranchBlock {
            branch,
            lanes,
            merge,
        }
    }

    /// Appends a node (or a whole branch block) to the end of the canvas.
    /// Returns the id of the new node, for a branch the id of the branch node.
    pub fn add_node(&mut self, kind: NodeKind, name: Option<&str>) -> Result<String, GraphError> {
        if kind.is_structural() {
            return Err(GraphError::StructuralKind(kind.display_name().to_string()));
        }
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(kind.display_name())
            .to_string();

        let id = if kind == NodeKind::Branch {
            let block = self.branch_block(name);
            let id = block.branch.id.clone();
            self.items.push(CanvasItem::Branch(block));
            id
        } else {
            let id = self.next_id("node");
            self.items.push(CanvasItem::Node(Node::new(id.clone(), kind, name)));
            id
        };
        tracing::debug!(node_id = %id, %kind, "added workflow node");
        Ok(id)
    }

    /// Adds a node at the end of one lane of a branch.
    pub fn add_node_in_lane(
        &mut self,
        branch_id: &str,
        lane: usize,
        kind: NodeKind,
        name: Option<&str>,
    ) -> Result<String, GraphError> {
        if kind.is_structural() || kind == NodeKind::Branch {
            return Err(GraphError::StructuralKind(kind.display_name().to_string()));
        }
        let item = self.branch_index(branch_id)?;
        let id = self.next_id("node");
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(kind.display_name())
            .to_string();
        let CanvasItem::Branch(block) = &mut self.items[item] else {
            return Err(GraphError::NotABranch(branch_id.to_string()));
        };
        let target = block
            .lanes
            .get_mut(lane)
            .ok_or_else(|| GraphError::LaneOutOfRange {
                branch_id: branch_id.to_string(),
                lane,
            })?;
        target.nodes.push(Node::new(id.clone(), kind, name));
        Ok(id)
    }

    fn branch_index(&self, branch_id: &str) -> Result<usize, GraphError> {
        match self.locate(branch_id) {
            Some(NodePosition::BranchHead(item)) => Ok(item),
            Some(_) => Err(GraphError::NotABranch(branch_id.to_string())),
            None => Err(GraphError::NodeNotFound(branch_id.to_string())),
        }
    }

    pub fn branch(&self, branch_id: &str) -> Option<&BranchBlock> {
        self.items.iter().find_map(|item| match item {
            CanvasItem::Branch(block) if block.branch.id == branch_id => Some(block),
            _ => None,
        })
    }

    /// Grows or shrinks a branch to `max(count, 2)` lanes.
    /// Returns the ids of the nodes removed with dropped lanes.
    pub fn apply_branch_count(
        &mut self,
        branch_id: &str,
        count: usize,
    ) -> Result<Vec<String>, GraphError> {
        let item = self.branch_index(branch_id)?;
        let target = count.max(MIN_BRANCHES);
        let current = match &self.items[item] {
            CanvasItem::Branch(block) => block.lanes.len(),
            CanvasItem::Node(_) => return Err(GraphError::NotABranch(branch_id.to_string())),
        };

        let new_lanes: Vec<Lane> = (current + 1..=target)
            .map(|i| Lane {
                condition: self.condition_node(i),
                nodes: Vec::new(),
            })
            .collect();

        let CanvasItem::Branch(block) = &mut self.items[item] else {
            return Err(GraphError::NotABranch(branch_id.to_string()));
        };
        block.lanes.extend(new_lanes);
        let removed = block
            .lanes
            .drain(target.min(block.lanes.len())..)
            .flat_map(|lane| {
                std::iter::once(lane.condition.id).chain(lane.nodes.into_iter().map(|n| n.id))
            })
            .collect();
        tracing::debug!(branch_id, lanes = target, "applied branch count");
        Ok(removed)
    }

    /// Deletes a node. Deleting a branch node removes its whole block.
    /// Returns the ids of every removed node.
    pub fn delete_node(&mut self, node_id: &str) -> Result<Vec<String>, GraphError> {
        let position = self
            .locate(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        let removed = match position {
            NodePosition::Condition { .. } | NodePosition::Merge(_) => {
                let kind = match position {
                    NodePosition::Merge(_) => NodeKind::Merge,
                    _ => NodeKind::Condition,
                };
                return Err(GraphError::ProtectedNode {
                    node_id: node_id.to_string(),
                    kind: kind.display_name().to_string(),
                });
            }
            NodePosition::BranchHead(item) => match self.items.remove(item) {
                CanvasItem::Branch(block) => block.node_ids(),
                CanvasItem::Node(node) => vec![node.id],
            },
            NodePosition::Item(item) => match self.items.remove(item) {
                CanvasItem::Node(node) => vec![node.id],
                CanvasItem::Branch(block) => block.node_ids(),
            },
            NodePosition::InLane { item, lane, index } => match &mut self.items[item] {
                CanvasItem::Branch(block) => vec![block.lanes[lane].nodes.remove(index).id],
                CanvasItem::Node(_) => return Err(GraphError::NodeNotFound(node_id.to_string())),
            },
        };
        tracing::debug!(node_id, removed = removed.len(), "deleted workflow node");
        Ok(removed)
    }

    pub fn locate(&self, node_id: &str) -> Option<NodePosition> {
        for (item, entry) in self.items.iter().enumerate() {
            match entry {
                CanvasItem::Node(node) if node.id == node_id => return Some(NodePosition::Item(item)),
                CanvasItem::Node(_) => {}
                CanvasItem::Branch(block) => {
                    if block.branch.id == node_id {
                        return Some(NodePosition::BranchHead(item));
                    }
                    if block.merge.id == node_id {
                        return Some(NodePosition::Merge(item));
                    }
                    for (lane, path) in block.lanes.iter().enumerate() {
                        if path.condition.id == node_id {
                            return Some(NodePosition::Condition { item, lane });
                        }
                        if let Some(index) = path.nodes.iter().position(|n| n.id == node_id) {
                            return Some(NodePosition::InLane { item, lane, index });
                        }
                    }
                }
            }
        }
        None
    }

    pub fn find(&self, node_id: &str) -> Option<&Node> {
        self.nodes().into_iter().find(|n| n.id == node_id)
    }

    pub fn find_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        let position = self.locate(node_id)?;
        match position {
            NodePosition::Item(i) => match &mut self.items[i] {
                CanvasItem::Node(node) => Some(node),
                CanvasItem::Branch(_) => None,
            },
            NodePosition::BranchHead(i) => match &mut self.items[i] {
                CanvasItem::Branch(block) => Some(&mut block.branch),
                CanvasItem::Node(_) => None,
            },
            NodePosition::Merge(i) => match &mut self.items[i] {
                CanvasItem::Branch(block) => Some(&mut block.merge),
                CanvasItem::Node(_) => None,
            },
            NodePosition::Condition { item, lane } => match &mut self.items[item] {
                CanvasItem::Branch(block) => Some(&mut block.lanes[lane].condition),
                CanvasItem::Node(_) => None,
            },
            NodePosition::InLane { item, lane, index } => match &mut self.items[item] {
                CanvasItem::Branch(block) => Some(&mut block.lanes[lane].nodes[index]),
                CanvasItem::Node(_) => None,
            },
        }
    }

    pub fn rename(&mut self, node_id: &str, name: &str) -> Result<(), GraphError> {
        if name.trim().is_empty() {
            return Err(GraphError::EmptyName);
        }
        let node = self
            .find_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.name = name.to_string();
        Ok(())
    }

    /// Every node in canvas order: branch node, then each lane's condition
    /// and nodes, then the merge node.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        for item in &self.items {
            match item {
                CanvasItem::Node(node) => nodes.push(node),
                CanvasItem::Branch(block) => {
                    nodes.push(&block.branch);
                    for lane in &block.lanes {
                        nodes.push(&lane.condition);
                        nodes.extend(lane.nodes.iter());
                    }
                    nodes.push(&block.merge);
                }
            }
        }
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    pub fn has_kind(&self, kind: NodeKind) -> bool {
        self.nodes().iter().any(|n| n.kind == kind)
    }

    /// Edges implied by the layout: consecutive items are linked, a branch
    /// fans out to its conditions, each lane runs down to the merge node.
    pub fn connections(&self) -> Vec<Connection> {
        let mut edges = Vec::new();
        let mut tail: Option<&str> = None;
        for item in &self.items {
            match item {
                CanvasItem::Node(node) => {
                    if let Some(from) = tail {
                        edges.push(Connection::new(from, &node.id));
                    }
                    tail = Some(node.id.as_str());
                }
                CanvasItem::Branch(block) => {
                    if let Some(from) = tail {
                        edges.push(Connection::new(from, &block.branch.id));
                    }
                    for lane in &block.lanes {
                        edges.push(Connection::new(&block.branch.id, &lane.condition.id));
                        let mut previous = lane.condition.id.as_str();
                        for node in &lane.nodes {
                            edges.push(Connection::new(previous, &node.id));
                            previous = node.id.as_str();
                        }
                        edges.push(Connection::new(previous, &block.merge.id));
                    }
                    tail = Some(block.merge.id.as_str());
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_share_one_counter() {
        let mut graph = WorkflowGraph::new();
        assert_eq!(graph.add_node(NodeKind::Start, None).unwrap(), "node-1");
        assert_eq!(graph.add_node(NodeKind::Branch, None).unwrap(), "node-2");
        let block = graph.branch("node-2").unwrap();
        assert_eq!(block.lanes[0].condition.id, "branch-sub-node-3");
        assert_eq!(block.lanes[1].condition.name, "条件 2");
        assert_eq!(block.merge.id, "merge-5");
        assert_eq!(graph.add_node(NodeKind::End, None).unwrap(), "node-6");
    }

    #[test]
    fn structural_kinds_cannot_be_added_alone() {
        let mut graph = WorkflowGraph::new();
        assert!(matches!(
            graph.add_node(NodeKind::Merge, None),
            Err(GraphError::StructuralKind(_))
        ));
    }

    #[test]
    fn branch_count_never_drops_below_two() {
        let mut graph = WorkflowGraph::new();
        let branch = graph.add_node(NodeKind::Branch, None).unwrap();
        graph.apply_branch_count(&branch, 4).unwrap();
        assert_eq!(graph.branch(&branch).unwrap().lanes.len(), 4);
        assert_eq!(graph.branch(&branch).unwrap().lanes[3].condition.name, "条件 4");
        let removed = graph.apply_branch_count(&branch, 0).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.branch(&branch).unwrap().lanes.len(), 2);
    }

    #[test]
    fn rename_reaches_every_node_in_a_block() {
        let mut graph = WorkflowGraph::new();
        let branch = graph.add_node(NodeKind::Branch, None).unwrap();
        let lane_node = graph
            .add_node_in_lane(&branch, 1, NodeKind::Cc, None)
            .unwrap();
        let (condition, merge) = {
            let block = graph.branch(&branch).unwrap();
            (block.lanes[0].condition.id.clone(), block.merge.id.clone())
        };
        graph.rename(&branch, "金额判断").unwrap();
        graph.rename(&merge, "汇总").unwrap();
        graph.rename(&condition, "金额 > 1000").unwrap();
        graph.rename(&lane_node, "抄送财务").unwrap();

        let block = graph.branch(&branch).unwrap();
        assert_eq!(block.branch.name, "金额判断");
        assert_eq!(block.merge.name, "汇总");
        assert_eq!(block.lanes[0].condition.name, "金额 > 1000");
        assert_eq!(block.lanes[1].nodes[0].name, "抄送财务");
        assert_eq!(
            graph.rename("node-99", "x"),
            Err(GraphError::NodeNotFound("node-99".to_string()))
        );
    }

    #[test]
    fn lane_nodes_are_chained() {
        let mut graph = WorkflowGraph::new();
        let branch = graph.add_node(NodeKind::Branch, None).unwrap();
        let a = graph
            .add_node_in_lane(&branch, 0, NodeKind::Approval, Some("经理审批"))
            .unwrap();
        let block = graph.branch(&branch).unwrap();
        let condition = block.lanes[0].condition.id.clone();
        let merge = block.merge.id.clone();
        let edges = graph.connections();
        assert!(edges.contains(&Connection::new(&condition, &a)));
        assert!(edges.contains(&Connection::new(&a, &merge)));
        assert_eq!(
            graph.add_node_in_lane(&branch, 5, NodeKind::Task, None),
            Err(GraphError::LaneOutOfRange {
                branch_id: branch.clone(),
                lane: 5
            })
        );
    }
}
