use crate::workflow::{CanvasItem, Node, WorkflowGraph};
use itertools::Itertools;

/// Formats a workflow canvas as indented text, top to bottom.
pub fn render_workflow(graph: &WorkflowGraph) -> String {
    if graph.is_empty() {
        return "(empty workflow)\n".to_string();
    }
    let mut out = String::new();
    for (index, item) in graph.items().iter().enumerate() {
        if index > 0 {
            out.push_str("  │\n");
        }
        match item {
            CanvasItem::Node(node) => {
                out.push_str(&format!("{}\n", node_line(node)));
            }
            CanvasItem::Branch(block) => {
                out.push_str(&format!("{}\n", node_line(&block.branch)));
                for (lane, path) in block.lanes.iter().enumerate() {
                    let trail = std::iter::once(&path.condition)
                        .chain(path.nodes.iter())
                        .map(node_line)
                        .join(" → ");
                    let glyph = if lane + 1 == block.lanes.len() { "└─" } else { "├─" };
                    out.push_str(&format!("  {} {}\n", glyph, trail));
                }
                out.push_str(&format!("{}\n", node_line(&block.merge)));
            }
        }
    }
    out
}

fn node_line(node: &Node) -> String {
    format!("{} {} [{}]", node.kind.icon(), node.name, node.id)
}
