use crate::analysis::ReportAnalysis;
use crate::error::{ReportError, Result};
use crate::{AMBIGUOUS, GAP};
use serde::Serialize;
use std::collections::HashMap;

/// The state a node would have inherited from its parents at one alignment
/// column, absent any mutation of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inherited {
    /// `X` when equally-supported lineages disagree.
    pub amino_acid: char,
    /// Mutation events along the best-supported lineage up to the parents.
    pub height: usize,
    /// The parent the inherited state was taken from, if any.
    pub source: Option<String>,
}

/// Classification of a node's observed letter against its inherited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMode {
    None,
    Delete,
    Insert,
    Change,
}

impl ReportAnalysis {
    /// Inherited states for one alignment column, every node at once.
    ///
    /// One pass over the topological order computes the whole column; each
    /// node only needs the heights of its parents, which the order
    /// guarantees are already known. Keeping this columnwise avoids the
    /// unbounded mutual recursion of the per-node formulation on deep
    /// dependency chains.
    fn inherited_column(&self, position: usize) -> Result<HashMap<String, Inherited>> {
        self.inherited_memo.get_or_insert_with(position, || {
            let length = self.report().alignment_length();
            if position >= length {
                return Err(ReportError::PositionOutOfRange { position, length });
            }
            let order = self.topological_order()?;
            let mut column: HashMap<String, Inherited> = HashMap::with_capacity(order.len());
            let mut heights: HashMap<&str, usize> = HashMap::with_capacity(order.len());
            for node_id in &order {
                let node = self.report().node(node_id)?;
                let mut amino_acid = GAP;
                let mut height = 0;
                let mut source = None;
                for parent in &node.parents {
                    let parent_amino_acid = self
                        .report()
                        .node(parent)?
                        .amino_acid_at(position)
                        .unwrap_or(GAP);
                    let parent_height = heights[parent.as_str()];
                    if parent_height > height {
                        source = Some(parent.clone());
                        height = parent_height;
                        amino_acid = parent_amino_acid;
                    } else if parent_height == height && amino_acid != parent_amino_acid {
                        // An exact tie with a disagreeing lineage poisons the
                        // letter but keeps the source and height already found.
                        amino_acid = AMBIGUOUS;
                    }
                }
                let observed = node.amino_acid_at(position).unwrap_or(GAP);
                let node_height = if observed == amino_acid {
                    height
                } else {
                    height + 1
                };
                heights.insert(node_id.as_str(), node_height);
                column.insert(
                    node_id.clone(),
                    Inherited {
                        amino_acid,
                        height,
                        source,
                    },
                );
            }
            Ok(column)
        })
    }

    /// The state `node_id` would have inherited at `position`. Root nodes
    /// inherit a gap at height 0 with no source.
    pub fn inherited(&self, node_id: &str, position: usize) -> Result<Inherited> {
        let column = self.inherited_column(position)?;
        column
            .get(node_id)
            .cloned()
            .ok_or_else(|| ReportError::UnknownNode(node_id.to_string()))
    }

    /// Mutation events along the best-supported lineage up to and including
    /// this node: the inherited height, plus one if the node's observed
    /// letter differs from the inherited one.
    pub fn height(&self, node_id: &str, position: usize) -> Result<usize> {
        let inherited = self.inherited(node_id, position)?;
        let observed = self
            .report()
            .node(node_id)?
            .amino_acid_at(position)
            .unwrap_or(GAP);
        Ok(if observed == inherited.amino_acid {
            inherited.height
        } else {
            inherited.height + 1
        })
    }

    /// Classifies the node's observed letter against its inherited one.
    /// Precedence: equality, then observed gap, then inherited gap.
    pub fn change_mode(&self, node_id: &str, position: usize) -> Result<ChangeMode> {
        let inherited = self.inherited(node_id, position)?;
        let observed = self
            .report()
            .node(node_id)?
            .amino_acid_at(position)
            .unwrap_or(GAP);
        Ok(if observed == inherited.amino_acid {
            ChangeMode::None
        } else if observed == GAP {
            ChangeMode::Delete
        } else if inherited.amino_acid == GAP {
            ChangeMode::Insert
        } else {
            ChangeMode::Change
        })
    }
}
