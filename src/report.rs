use crate::error::{ReportError, Result};
use crate::ALIGNMENT_ALPHABET;
use anyhow::Context;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A directly observed sequence.
    Leaf,
    /// An inferred ancestral sequence.
    Other,
    /// An inferred ancestor with no parents of its own.
    Root,
}

/// One point in the sequence-ancestry DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub sequence_id: Option<String>,
    /// Aligned amino acid letters, one per alignment column. `-` is a gap.
    pub amino_acids: String,
    /// Ancestry edges. Root nodes have none.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Assembly dependency edges, pointing at what this node was built from.
    #[serde(default)]
    pub edges: Vec<String>,
}

impl Node {
    pub fn amino_acid_at(&self, position: usize) -> Option<char> {
        self.amino_acids.as_bytes().get(position).map(|&b| b as char)
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }
}

/// A raw sequence record; `edges` lists the node ids it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub edges: Vec<String>,
}

/// What a plan instruction (or a serialized display row) refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Action {
    /// Assembles sub-parts; carries a primary branch and (module, leftover)
    /// alternative pairs in the instruction's `values`.
    Combine,
    /// References a node by id.
    Node(String),
    /// References a raw sequence by index.
    Sequence(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub action: Action,
    /// Indices of the instructions this one depends on. For `Combine`:
    /// `[primary, alt1_module, alt1_leftover, alt2_module, alt2_leftover, ...]`.
    #[serde(default)]
    pub values: Vec<usize>,
}

/// The assembly plan: an instruction DAG rooted at `target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub target: usize,
}

/// Per-alignment-column data, both strings indexed by instruction index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub amino_acids: String,
    /// `'1'` where the instruction contributes the primary signal here.
    #[serde(default)]
    pub primary: String,
}

impl Position {
    pub fn amino_acid_for(&self, instruction: usize) -> Option<char> {
        self.amino_acids.as_bytes().get(instruction).map(|&b| b as char)
    }

    pub fn is_primary(&self, instruction: usize) -> bool {
        self.primary.as_bytes().get(instruction) == Some(&b'1')
    }
}

/// A loaded ancestral-sequence-reconstruction report. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Node id to node, in the exporter's insertion order.
    pub nodes: IndexMap<String, Node>,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl Report {
    pub fn from_json_file(filename: &str) -> anyhow::Result<Self> {
        let file = File::open(filename)
            .with_context(|| format!("Could not open report file '{filename}'"))?;
        let report: Report = serde_json::from_reader(io::BufReader::new(file))
            .with_context(|| format!("Could not parse report file '{filename}'"))?;
        log::debug!(
            "loaded report: {} nodes, {} sequences, {} instructions, {} positions",
            report.nodes.len(),
            report.sequences.len(),
            report.plan.instructions.len(),
            report.positions.len()
        );
        Ok(report)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let report: Report = serde_json::from_str(data).context("Could not parse report JSON")?;
        Ok(report)
    }

    pub fn node(&self, node_id: &str) -> Result<&Node> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| ReportError::UnknownNode(node_id.to_string()))
    }

    pub fn sequence(&self, index: usize) -> Result<&Sequence> {
        self.sequences
            .get(index)
            .ok_or(ReportError::UnknownSequence(index))
    }

    pub fn instruction(&self, index: usize) -> Result<&Instruction> {
        self.plan
            .instructions
            .get(index)
            .ok_or(ReportError::UnknownInstruction(index))
    }

    pub fn position(&self, index: usize) -> Result<&Position> {
        self.positions.get(index).ok_or(ReportError::PositionOutOfRange {
            position: index,
            length: self.positions.len(),
        })
    }

    /// Number of alignment columns, shared by every node in the report.
    pub fn alignment_length(&self) -> usize {
        self.nodes
            .values()
            .next()
            .map(|node| node.amino_acids.len())
            .unwrap_or(0)
    }

    /// Checks the structural invariants the analysis relies on: all
    /// references resolve, alignment lengths agree, letters come from the
    /// alignment alphabet, and instruction values are in range. Cycles are
    /// detected separately by the topological sort.
    pub fn validate(&self) -> Result<()> {
        let length = self.alignment_length();
        for (node_id, node) in &self.nodes {
            if node.amino_acids.len() != length {
                return Err(ReportError::MalformedGraph(format!(
                    "node '{node_id}' has alignment length {} but the report uses {length}",
                    node.amino_acids.len()
                )));
            }
            if let Some(bad) = node
                .amino_acids
                .chars()
                .find(|c| !ALIGNMENT_ALPHABET.contains(c))
            {
                return Err(ReportError::MalformedGraph(format!(
                    "node '{node_id}' contains letter '{bad}' outside the alignment alphabet"
                )));
            }
            for parent in &node.parents {
                if !self.nodes.contains_key(parent) {
                    return Err(ReportError::MalformedGraph(format!(
                        "node '{node_id}' references unknown parent '{parent}'"
                    )));
                }
            }
            for edge in &node.edges {
                if !self.nodes.contains_key(edge) {
                    return Err(ReportError::MalformedGraph(format!(
                        "node '{node_id}' references unknown edge target '{edge}'"
                    )));
                }
            }
        }
        for (index, sequence) in self.sequences.iter().enumerate() {
            for edge in &sequence.edges {
                if !self.nodes.contains_key(edge) {
                    return Err(ReportError::MalformedGraph(format!(
                        "sequence {index} references unknown edge target '{edge}'"
                    )));
                }
            }
        }
        let instruction_count = self.plan.instructions.len();
        for (index, instruction) in self.plan.instructions.iter().enumerate() {
            if let Some(&bad) = instruction.values.iter().find(|&&v| v >= instruction_count) {
                return Err(ReportError::MalformedGraph(format!(
                    "instruction {index} references out-of-range instruction {bad}"
                )));
            }
            if let Action::Node(node_id) = &instruction.action {
                if !self.nodes.contains_key(node_id) {
                    return Err(ReportError::MalformedGraph(format!(
                        "instruction {index} references unknown node '{node_id}'"
                    )));
                }
            }
        }
        if instruction_count > 0 && self.plan.target >= instruction_count {
            return Err(ReportError::MalformedGraph(format!(
                "plan target {} is out of range ({} instructions)",
                self.plan.target, instruction_count
            )));
        }
        if !self.positions.is_empty() && self.positions.len() != length {
            return Err(ReportError::MalformedGraph(format!(
                "{} positions for an alignment of length {length}",
                self.positions.len()
            )));
        }
        for (index, position) in self.positions.iter().enumerate() {
            if instruction_count > 0 && position.amino_acids.len() != instruction_count {
                return Err(ReportError::MalformedGraph(format!(
                    "position {index} tracks {} instructions but the plan has {instruction_count}",
                    position.amino_acids.len()
                )));
            }
            if let Some(bad) = position
                .primary
                .chars()
                .find(|&c| c != '0' && c != '1')
            {
                return Err(ReportError::MalformedGraph(format!(
                    "position {index} has non-bit character '{bad}' in its primary mask"
                )));
            }
        }
        Ok(())
    }

    /// Leaf node ids, in report order.
    pub fn leaf_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id.as_str())
            .collect_vec()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Report;

    /// Five-node ancestry DAG with an assembly plan.
    ///
    /// Topology: A (root) <- B <- {C, D} <- E, with C and D observed leaves.
    /// The plan combines from instruction 5 with a primary branch (0) and two
    /// alternative (module, leftover) pairs: (1, 2) and (3, 4); instruction 6
    /// is only reachable through module 3.
    pub(crate) const SAMPLE_REPORT: &str = r#"{
        "nodes": {
            "A": {"kind": "root",  "sequence_id": null,    "amino_acids": "M-A", "parents": [],         "edges": []},
            "B": {"kind": "other", "sequence_id": null,    "amino_acids": "M-A", "parents": ["A"],      "edges": ["A"]},
            "C": {"kind": "leaf",  "sequence_id": "seq-c", "amino_acids": "KCA", "parents": ["B"],      "edges": ["B"]},
            "D": {"kind": "leaf",  "sequence_id": "seq-d", "amino_acids": "GC-", "parents": ["B"],      "edges": ["B"]},
            "E": {"kind": "other", "sequence_id": null,    "amino_acids": "KC-", "parents": ["C", "D"], "edges": ["C", "D"]}
        },
        "sequences": [
            {"edges": ["C"]},
            {"edges": ["C", "D"]}
        ],
        "plan": {
            "target": 5,
            "instructions": [
                {"action": {"type": "Node", "value": "A"},  "values": []},
                {"action": {"type": "Node", "value": "B"},  "values": []},
                {"action": {"type": "Sequence", "value": 0}, "values": []},
                {"action": {"type": "Node", "value": "C"},  "values": [6]},
                {"action": {"type": "Sequence", "value": 1}, "values": []},
                {"action": {"type": "Combine"},              "values": [0, 1, 2, 3, 4]},
                {"action": {"type": "Node", "value": "D"},  "values": []}
            ]
        },
        "positions": [
            {"amino_acids": "-K---M-", "primary": "0100000"},
            {"amino_acids": "A----A-", "primary": "0000000"},
            {"amino_acids": "---T-TS", "primary": "0001000"}
        ]
    }"#;

    pub(crate) fn sample_report() -> Report {
        let report = Report::from_json_str(SAMPLE_REPORT).unwrap();
        report.validate().unwrap();
        report
    }
}
