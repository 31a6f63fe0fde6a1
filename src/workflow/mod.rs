//! The approval workflow designer: a canvas of typed nodes with branch
//! blocks, a property panel per node and a publish check.

pub mod designer;
pub mod graph;
pub mod properties;
pub mod script;

pub use designer::{NodeSummary, WorkflowDesigner, WorkflowDocument, WorkflowInfo};
pub use graph::{
    BranchBlock, CanvasItem, Connection, Lane, MIN_BRANCHES, Node, NodeKind, NodePosition,
    WorkflowGraph,
};
pub use properties::{NodeConfig, NodeProperties};
pub use script::{GraphCommand, apply_script};
