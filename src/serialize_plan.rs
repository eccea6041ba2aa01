use crate::analysis::ReportAnalysis;
use crate::error::{ReportError, Result};
use crate::report::Action;
use crate::serialize_dag::{push_subtree, Indented, IndentPart};
use serde::Serialize;
use std::collections::HashSet;

/// One row of the linearized assembly plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// The instruction this row displays.
    pub index: usize,
    pub action: Action,
    /// The instruction whose expansion produced this row; `None` only on
    /// the root row of the serialization.
    pub parent_index: Option<usize>,
    pub indent: Vec<IndentPart>,
    /// Every branch this step could have followed: the primary plus each
    /// alternative module, regardless of the selection made.
    pub alternates: Vec<usize>,
}

impl Indented for PlanEntry {
    fn indent_mut(&mut self) -> &mut Vec<IndentPart> {
        &mut self.indent
    }
}

impl ReportAnalysis {
    /// True iff `target` is reachable from `index` over instruction
    /// `values` edges (an instruction reaches itself). Iterative walk, so
    /// deep plans do not grow the call stack.
    pub fn has_target(&self, index: usize, target: usize) -> Result<bool> {
        self.has_target_memo.get_or_insert_with((index, target), || {
            let mut stack = vec![index];
            let mut visited: HashSet<usize> = HashSet::new();
            while let Some(current) = stack.pop() {
                if current == target {
                    return Ok(true);
                }
                if !visited.insert(current) {
                    continue;
                }
                for &value in &self.report().instruction(current)?.values {
                    if !visited.contains(&value) {
                        stack.push(value);
                    }
                }
            }
            Ok(false)
        })
    }

    /// Linearizes the plan from `index` into indent-annotated display rows.
    ///
    /// Non-`Combine` instructions expand all of their values. A `Combine`
    /// follows a single branch: by default the primary (`values[0]`) alone;
    /// with `target` set, the first alternative (module, leftover) pair that
    /// reaches the target when the primary does not; with `follow_position`
    /// set, the first pair whose module carries the primary signal at that
    /// column. The position-based selection is applied last and wins when
    /// both selectors are supplied.
    pub fn serialize_plan(
        &self,
        index: usize,
        target: Option<usize>,
        follow_position: Option<usize>,
    ) -> Result<Vec<PlanEntry>> {
        self.plan_memo
            .get_or_insert_with((index, target, follow_position), || {
                let instruction = self.report().instruction(index)?.clone();
                if instruction.action != Action::Combine {
                    let mut entries = vec![PlanEntry {
                        index,
                        action: instruction.action,
                        parent_index: None,
                        indent: Vec::new(),
                        alternates: Vec::new(),
                    }];
                    self.expand_plan_values(
                        &mut entries,
                        index,
                        &instruction.values,
                        target,
                        follow_position,
                    )?;
                    return Ok(entries);
                }

                let values = &instruction.values;
                let mut follow_index = 0;
                if let Some(target) = target {
                    if !values.is_empty() && !self.has_target(values[0], target)? {
                        let mut current = 1;
                        while current + 1 < values.len() {
                            if self.has_target(values[current], target)?
                                || self.has_target(values[current + 1], target)?
                            {
                                follow_index = current;
                                break;
                            }
                            current += 2;
                        }
                    }
                }
                if let Some(follow_position) = follow_position {
                    let position = self.report().position(follow_position)?;
                    let mut current = 1;
                    while current < values.len() {
                        if position.is_primary(values[current]) {
                            follow_index = current;
                            break;
                        }
                        current += 2;
                    }
                }

                let mut alternates = Vec::new();
                if !values.is_empty() {
                    alternates.push(values[0]);
                }
                let mut current = 1;
                while current < values.len() {
                    alternates.push(values[current]);
                    current += 2;
                }

                let inner = if follow_index == 0 {
                    values.first().map(|&primary| vec![primary]).unwrap_or_default()
                } else {
                    let module = values[follow_index];
                    let leftover = *values.get(follow_index + 1).ok_or_else(|| {
                        ReportError::MalformedGraph(format!(
                            "combine instruction {index} selects module slot {follow_index} without a leftover"
                        ))
                    })?;
                    vec![module, leftover]
                };

                let mut entries = vec![PlanEntry {
                    index,
                    action: instruction.action,
                    parent_index: None,
                    indent: Vec::new(),
                    alternates,
                }];
                self.expand_plan_values(&mut entries, index, &inner, target, follow_position)?;
                Ok(entries)
            })
    }

    /// Serializes each followed value and appends it as an indented subtree,
    /// filling in `parent_index` on any row deeper recursion left unclaimed.
    fn expand_plan_values(
        &self,
        entries: &mut Vec<PlanEntry>,
        index: usize,
        values: &[usize],
        target: Option<usize>,
        follow_position: Option<usize>,
    ) -> Result<()> {
        let count = values.len();
        for (source_index, &value) in values.iter().enumerate() {
            let mut inner = self.serialize_plan(value, target, follow_position)?;
            for item in &mut inner {
                if item.parent_index.is_none() {
                    item.parent_index = Some(index);
                }
            }
            push_subtree(entries, inner, source_index == count - 1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;
    use IndentPart::{Join, Line};

    fn analysis() -> ReportAnalysis {
        ReportAnalysis::new(sample_report())
    }

    fn row(
        index: usize,
        action: Action,
        parent_index: Option<usize>,
        indent: &[IndentPart],
        alternates: &[usize],
    ) -> PlanEntry {
        PlanEntry {
            index,
            action,
            parent_index,
            indent: indent.to_vec(),
            alternates: alternates.to_vec(),
        }
    }

    #[test]
    fn test_has_target_is_reflexive_and_transitive() {
        let analysis = analysis();
        assert!(analysis.has_target(5, 5).unwrap());
        assert!(analysis.has_target(3, 6).unwrap());
        assert!(analysis.has_target(5, 6).unwrap());
        assert!(!analysis.has_target(0, 6).unwrap());
        assert!(!analysis.has_target(6, 5).unwrap());
    }

    #[test]
    fn test_has_target_unknown_instruction() {
        let analysis = analysis();
        assert_eq!(
            analysis.has_target(42, 0).unwrap_err(),
            ReportError::UnknownInstruction(42)
        );
    }

    #[test]
    fn test_combine_follows_primary_by_default() {
        let analysis = analysis();
        assert_eq!(
            analysis.serialize_plan(5, None, None).unwrap(),
            [
                row(5, Action::Combine, None, &[], &[0, 1, 3]),
                row(0, Action::Node("A".to_string()), Some(5), &[Join], &[]),
            ]
        );
    }

    #[test]
    fn test_combine_selects_pair_reaching_target() {
        // Instruction 6 is only reachable through module 3, so the follow
        // branch becomes the (3, 4) pair while the alternates stay complete.
        let analysis = analysis();
        assert_eq!(
            analysis.serialize_plan(5, Some(6), None).unwrap(),
            [
                row(5, Action::Combine, None, &[], &[0, 1, 3]),
                row(3, Action::Node("C".to_string()), Some(5), &[Join], &[]),
                row(6, Action::Node("D".to_string()), Some(3), &[Line, Join], &[]),
                row(4, Action::Sequence(1), Some(5), &[Join], &[]),
            ]
        );
    }

    #[test]
    fn test_combine_keeps_primary_when_it_reaches_target() {
        let analysis = analysis();
        let entries = analysis.serialize_plan(5, Some(0), None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 0);
    }

    #[test]
    fn test_combine_follows_position_primary_flag() {
        // Column 0 flags instruction 1 as primary: follow the (1, 2) pair.
        let analysis = analysis();
        assert_eq!(
            analysis.serialize_plan(5, None, Some(0)).unwrap(),
            [
                row(5, Action::Combine, None, &[], &[0, 1, 3]),
                row(1, Action::Node("B".to_string()), Some(5), &[Join], &[]),
                row(2, Action::Sequence(0), Some(5), &[Join], &[]),
            ]
        );
    }

    #[test]
    fn test_position_selection_overrides_target_selection() {
        // Target 6 alone would pick the (3, 4) pair; the position flag on
        // instruction 1 runs second and wins.
        let analysis = analysis();
        let entries = analysis.serialize_plan(5, Some(6), Some(0)).unwrap();
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[2].index, 2);
    }

    #[test]
    fn test_position_without_flags_leaves_primary() {
        let analysis = analysis();
        let entries = analysis.serialize_plan(5, None, Some(1)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 0);
    }

    #[test]
    fn test_parent_index_filled_bottom_up() {
        let analysis = analysis();
        let entries = analysis.serialize_plan(5, Some(6), None).unwrap();
        assert_eq!(entries[0].parent_index, None);
        // Row for instruction 6 was claimed by instruction 3 one level down,
        // not by the combine that triggered the expansion.
        assert_eq!(entries[2].index, 6);
        assert_eq!(entries[2].parent_index, Some(3));
    }

    #[test]
    fn test_parent_index_zero_is_preserved() {
        let mut report = sample_report();
        // Rebuild the plan so the root is instruction 0 with one child.
        report.plan.target = 0;
        report.plan.instructions[0].values = vec![1];
        report.positions.clear();
        let analysis = ReportAnalysis::new(report);
        let entries = analysis.serialize_plan(0, None, None).unwrap();
        assert_eq!(entries[1].parent_index, Some(0));
    }

    #[test]
    fn test_entry_counts_add_up() {
        let analysis = analysis();
        // The combine expands exactly one branch: itself plus the recursive
        // counts of the followed pair.
        let entries = analysis.serialize_plan(5, Some(6), None).unwrap();
        let module = analysis.serialize_plan(3, Some(6), None).unwrap();
        let leftover = analysis.serialize_plan(4, Some(6), None).unwrap();
        assert_eq!(entries.len(), 1 + module.len() + leftover.len());
    }

    #[test]
    fn test_unknown_position_selector() {
        let analysis = analysis();
        assert_eq!(
            analysis.serialize_plan(5, None, Some(9)).unwrap_err(),
            ReportError::PositionOutOfRange {
                position: 9,
                length: 3
            }
        );
    }
}
