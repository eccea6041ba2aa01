use crate::analysis::ReportAnalysis;
use crate::error::{ReportError, Result};
use crate::GAP;
use itertools::Itertools;
use std::collections::HashSet;

impl ReportAnalysis {
    /// True iff `source` depends on `destination`, directly or transitively,
    /// by following `parents` edges (a node depends on itself).
    ///
    /// Walks with an explicit stack and a visited set, so call depth stays
    /// flat on long dependency chains and the walk terminates even if a
    /// malformed input smuggles a cycle past validation.
    pub fn reachable(&self, source: &str, destination: &str) -> Result<bool> {
        self.reachable_memo.get_or_insert_with(
            (source.to_string(), destination.to_string()),
            || {
                self.report().node(destination)?;
                let mut stack = vec![source];
                let mut visited: HashSet<&str> = HashSet::new();
                while let Some(current) = stack.pop() {
                    if current == destination {
                        return Ok(true);
                    }
                    if !visited.insert(current) {
                        continue;
                    }
                    for parent in &self.report().node(current)?.parents {
                        if !visited.contains(parent.as_str()) {
                            stack.push(parent.as_str());
                        }
                    }
                }
                Ok(false)
            },
        )
    }

    /// A permutation of all node ids in which every node appears after all
    /// of its parents. Fails with `MalformedGraph` when the fixed point
    /// stalls, i.e. the graph has a cycle or a dangling parent reference.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        self.topological_memo
            .get_or_init(|| {
                let nodes = &self.report().nodes;
                let mut order: Vec<String> = Vec::with_capacity(nodes.len());
                let mut placed: HashSet<&str> = HashSet::with_capacity(nodes.len());
                while order.len() < nodes.len() {
                    let mut changed = false;
                    for (node_id, node) in nodes {
                        if placed.contains(node_id.as_str()) {
                            continue;
                        }
                        if node
                            .parents
                            .iter()
                            .all(|parent| placed.contains(parent.as_str()))
                        {
                            placed.insert(node_id.as_str());
                            order.push(node_id.clone());
                            changed = true;
                        }
                    }
                    if !changed {
                        let stuck = nodes
                            .keys()
                            .filter(|id| !placed.contains(id.as_str()))
                            .join(", ");
                        return Err(ReportError::MalformedGraph(format!(
                            "cycle or dangling parent reference among nodes: {stuck}"
                        )));
                    }
                }
                Ok(order)
            })
            .clone()
    }

    /// `topological_order()`, reversed.
    pub fn reverse_topological_order(&self) -> Result<Vec<String>> {
        let mut order = self.topological_order()?;
        order.reverse();
        Ok(order)
    }

    /// Every node the given node transitively depends on (itself included),
    /// in reverse-topological order.
    pub fn all_dependencies(&self, node_id: &str) -> Result<Vec<String>> {
        self.dependencies_memo
            .get_or_insert_with(node_id.to_string(), || {
                let mut dependencies = Vec::new();
                for other in self.reverse_topological_order()? {
                    if self.reachable(node_id, &other)? {
                        dependencies.push(other);
                    }
                }
                Ok(dependencies)
            })
    }

    /// Alignment columns where at least one dependency of the node carries a
    /// non-gap letter.
    pub fn interesting_positions(&self, node_id: &str) -> Result<Vec<usize>> {
        self.interesting_memo
            .get_or_insert_with(node_id.to_string(), || {
                let dependencies = self.all_dependencies(node_id)?;
                let length = self.report().node(node_id)?.amino_acids.len();
                let mut positions = Vec::new();
                for position in 0..length {
                    for dependency in &dependencies {
                        let letter = self.report().node(dependency)?.amino_acid_at(position);
                        if letter.is_some() && letter != Some(GAP) {
                            positions.push(position);
                            break;
                        }
                    }
                }
                Ok(positions)
            })
    }
}
