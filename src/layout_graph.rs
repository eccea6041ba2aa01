use crate::analysis::ReportAnalysis;
use crate::error::Result;
use serde::Serialize;

/// Size hint for leaf nodes: wide and short, room for a label.
pub const LEAF_NODE_SIZE: (f32, f32) = (200.0, 50.0);
/// Size hint for inferred nodes: small and square.
pub const INNER_NODE_SIZE: (f32, f32) = (40.0, 40.0);

/// A labeled node handed to an external layout engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub width: f32,
    pub height: f32,
}

/// A directed edge handed to an external layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
}

/// An abstract graph view. The crate never computes coordinates; consumers
/// run their own layout over these nodes and edges and read positions back
/// on their side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    fn push_node(&mut self, node_id: &str, is_leaf: bool) {
        let (width, height) = if is_leaf {
            LEAF_NODE_SIZE
        } else {
            INNER_NODE_SIZE
        };
        self.nodes.push(LayoutNode {
            id: node_id.to_string(),
            label: node_id.to_string(),
            width,
            height,
        });
    }

    fn push_edge(&mut self, from: &str, to: &str) {
        self.edges.push(LayoutEdge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
}

impl ReportAnalysis {
    /// The node DAG as a layout graph, with parent -> child edges. With a
    /// focus node set, only nodes related to it by dependency in either
    /// direction are included.
    pub fn dependency_view(&self, focus: Option<&str>) -> Result<LayoutGraph> {
        self.dependency_view_memo
            .get_or_insert_with(focus.map(str::to_string), || {
                let include = |node_id: &str| -> Result<bool> {
                    match focus {
                        None => Ok(true),
                        Some(focus) => {
                            Ok(self.reachable(focus, node_id)?
                                || self.reachable(node_id, focus)?)
                        }
                    }
                };
                let mut graph = LayoutGraph::default();
                for (node_id, node) in &self.report().nodes {
                    if include(node_id)? {
                        graph.push_node(node_id, node.is_leaf());
                    }
                }
                for (node_id, node) in &self.report().nodes {
                    if include(node_id)? {
                        for parent in &node.parents {
                            if include(parent)? {
                                graph.push_edge(parent, node_id);
                            }
                        }
                    }
                }
                Ok(graph)
            })
    }

    /// The per-position inheritance graph: every node, with one edge from
    /// its nearest-height parent (the inherited source) where one exists.
    pub fn inheritance_view(&self, position: usize) -> Result<LayoutGraph> {
        self.inheritance_view_memo.get_or_insert_with(position, || {
            let mut graph = LayoutGraph::default();
            for (node_id, node) in &self.report().nodes {
                graph.push_node(node_id, node.is_leaf());
            }
            for node_id in self.report().nodes.keys() {
                if let Some(source) = self.inherited(node_id, position)?.source {
                    graph.push_edge(&source, node_id);
                }
            }
            Ok(graph)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    fn analysis() -> ReportAnalysis {
        ReportAnalysis::new(sample_report())
    }

    fn edge(from: &str, to: &str) -> LayoutEdge {
        LayoutEdge {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_full_dependency_view() {
        let analysis = analysis();
        let graph = analysis.dependency_view(None).unwrap();
        assert_eq!(graph.nodes.len(), 5);
        assert_eq!(
            graph.edges,
            [
                edge("A", "B"),
                edge("B", "C"),
                edge("B", "D"),
                edge("C", "E"),
                edge("D", "E"),
            ]
        );
    }

    #[test]
    fn test_size_hints_by_kind() {
        let analysis = analysis();
        let graph = analysis.dependency_view(None).unwrap();
        let leaf = graph.nodes.iter().find(|n| n.id == "C").unwrap();
        assert_eq!((leaf.width, leaf.height), LEAF_NODE_SIZE);
        let root = graph.nodes.iter().find(|n| n.id == "A").unwrap();
        assert_eq!((root.width, root.height), INNER_NODE_SIZE);
    }

    #[test]
    fn test_focused_dependency_view() {
        // Focus on C: E depends on C, C depends on B and A; D is unrelated.
        let analysis = analysis();
        let graph = analysis.dependency_view(Some("C")).unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C", "E"]);
        assert_eq!(
            graph.edges,
            [edge("A", "B"), edge("B", "C"), edge("C", "E")]
        );
    }

    #[test]
    fn test_focus_on_unknown_node() {
        let analysis = analysis();
        assert!(analysis.dependency_view(Some("Z")).is_err());
    }

    #[test]
    fn test_inheritance_view_uses_sources() {
        let analysis = analysis();
        let graph = analysis.inheritance_view(0).unwrap();
        assert_eq!(graph.nodes.len(), 5);
        // A is a root (no source); E's tie resolved to C at column 0.
        assert_eq!(
            graph.edges,
            [
                edge("A", "B"),
                edge("B", "C"),
                edge("B", "D"),
                edge("C", "E"),
            ]
        );
    }

    #[test]
    fn test_inheritance_view_gap_column() {
        // Column 1 is gap down through B, so C and D inherit the gap from
        // nothing in particular; only E picks a source among its parents.
        let analysis = analysis();
        let graph = analysis.inheritance_view(1).unwrap();
        assert_eq!(graph.edges, [edge("C", "E")]);
    }
}
