use crate::analysis::ReportAnalysis;
use crate::error::Result;
use crate::report::Action;
use serde::Serialize;

/// One column of tree-branch decoration on a display row, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentPart {
    /// Empty filler below a finished sibling.
    Gap,
    /// A sibling subtree is still pending further down.
    Line,
    /// This row is a branch point.
    Join,
}

/// One row of a linearized dependency or dependant tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub action: Action,
    pub indent: Vec<IndentPart>,
}

/// Prepends one indent column to a child subtree and appends it: `Join` on
/// the subtree's first row, then `Line` while later siblings are pending or
/// `Gap` once this was the last child.
pub(crate) fn push_subtree<E: Indented>(entries: &mut Vec<E>, inner: Vec<E>, is_last: bool) {
    for (item_index, mut item) in inner.into_iter().enumerate() {
        let marker = if item_index == 0 {
            IndentPart::Join
        } else if is_last {
            IndentPart::Gap
        } else {
            IndentPart::Line
        };
        item.indent_mut().insert(0, marker);
        entries.push(item);
    }
}

/// Display rows that carry an indent-marker column sequence.
pub(crate) trait Indented {
    fn indent_mut(&mut self) -> &mut Vec<IndentPart>;
}

impl Indented for TreeEntry {
    fn indent_mut(&mut self) -> &mut Vec<IndentPart> {
        &mut self.indent
    }
}

impl ReportAnalysis {
    /// Linearizes the node's transitive dependency tree: the node itself,
    /// then each `edges` subtree depth-first in source order.
    pub fn serialize_dependencies(&self, node_id: &str) -> Result<Vec<TreeEntry>> {
        self.dependencies_tree_memo
            .get_or_insert_with(node_id.to_string(), || {
                let edges = self.report().node(node_id)?.edges.clone();
                let mut entries = vec![TreeEntry {
                    action: Action::Node(node_id.to_string()),
                    indent: Vec::new(),
                }];
                let count = edges.len();
                for (source_index, value) in edges.iter().enumerate() {
                    let inner = self.serialize_dependencies(value)?;
                    push_subtree(&mut entries, inner, source_index == count - 1);
                }
                Ok(entries)
            })
    }

    /// As `serialize_dependencies`, rooted at a raw sequence record.
    pub fn serialize_sequence_dependencies(&self, index: usize) -> Result<Vec<TreeEntry>> {
        self.sequence_tree_memo.get_or_insert_with(index, || {
            let edges = self.report().sequence(index)?.edges.clone();
            let mut entries = vec![TreeEntry {
                action: Action::Sequence(index),
                indent: Vec::new(),
            }];
            let count = edges.len();
            for (source_index, value) in edges.iter().enumerate() {
                let inner = self.serialize_dependencies(value)?;
                push_subtree(&mut entries, inner, source_index == count - 1);
            }
            Ok(entries)
        })
    }

    /// Linearizes everything that points back at the node through its
    /// `edges`: first a one-row stub per referencing sequence, then the
    /// dependant subtree of each referencing node. The stubs render as bare
    /// branch points and do not take part in the last-child accounting.
    pub fn serialize_dependants(&self, node_id: &str) -> Result<Vec<TreeEntry>> {
        self.dependants_tree_memo
            .get_or_insert_with(node_id.to_string(), || {
                self.report().node(node_id)?;
                let mut entries = vec![TreeEntry {
                    action: Action::Node(node_id.to_string()),
                    indent: Vec::new(),
                }];
                for (index, sequence) in self.report().sequences.iter().enumerate() {
                    if sequence.edges.iter().any(|edge| edge == node_id) {
                        entries.push(TreeEntry {
                            action: Action::Sequence(index),
                            indent: vec![IndentPart::Join],
                        });
                    }
                }
                let incoming: Vec<String> = self
                    .report()
                    .nodes
                    .iter()
                    .filter(|(_, node)| node.edges.iter().any(|edge| edge == node_id))
                    .map(|(id, _)| id.clone())
                    .collect();
                let count = incoming.len();
                for (source_index, other) in incoming.iter().enumerate() {
                    let inner = self.serialize_dependants(other)?;
                    push_subtree(&mut entries, inner, source_index == count - 1);
                }
                Ok(entries)
            })
    }
}
