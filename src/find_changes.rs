use crate::analysis::ReportAnalysis;
use crate::error::Result;
use crate::report::Action;
use crate::GAP;
use serde::Serialize;

/// A change observed at one step of the followed plan, for a fixed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionChange {
    pub action: Action,
    pub parent_amino_acid: char,
    pub amino_acid: char,
}

/// A change observed for a fixed action, at some alignment column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionChange {
    pub index: usize,
    pub parent_amino_acid: char,
    pub amino_acid: char,
}

impl ReportAnalysis {
    /// Every step of the plan (followed at `position`) whose letter differs
    /// from its parent step's letter and is not a gap. The plan root has no
    /// parent and never matches.
    pub fn find_changes_for_position(&self, position: usize) -> Result<Vec<ActionChange>> {
        let column = self.report().position(position)?.clone();
        let root = self.report().plan.target;
        let mut changes = Vec::new();
        for entry in self.serialize_plan(root, None, Some(position))? {
            let Some(parent_index) = entry.parent_index else {
                continue;
            };
            let (Some(parent_amino_acid), Some(amino_acid)) = (
                column.amino_acid_for(parent_index),
                column.amino_acid_for(entry.index),
            ) else {
                continue;
            };
            if parent_amino_acid != amino_acid && amino_acid != GAP {
                changes.push(ActionChange {
                    action: entry.action,
                    parent_amino_acid,
                    amino_acid,
                });
            }
        }
        Ok(changes)
    }

    /// Scans every alignment column for steps matching `target_action` whose
    /// letter differs from the parent step's letter (gaps excluded).
    pub fn find_changes(&self, target_action: &Action) -> Result<Vec<PositionChange>> {
        let root = self.report().plan.target;
        let mut changes = Vec::new();
        for index in 0..self.report().positions.len() {
            let column = self.report().position(index)?.clone();
            for entry in self.serialize_plan(root, None, Some(index))? {
                if entry.action != *target_action {
                    continue;
                }
                let Some(parent_index) = entry.parent_index else {
                    continue;
                };
                let (Some(parent_amino_acid), Some(amino_acid)) = (
                    column.amino_acid_for(parent_index),
                    column.amino_acid_for(entry.index),
                ) else {
                    continue;
                };
                if parent_amino_acid != amino_acid && amino_acid != GAP {
                    changes.push(PositionChange {
                        index,
                        parent_amino_acid,
                        amino_acid,
                    });
                }
            }
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    fn analysis() -> ReportAnalysis {
        ReportAnalysis::new(sample_report())
    }

    #[test]
    fn test_changes_for_position_follow_flagged_branch() {
        // Column 0 follows the (1, 2) pair; instruction 1 reads K against
        // the combine's M, and the leftover's gap is skipped.
        let analysis = analysis();
        assert_eq!(
            analysis.find_changes_for_position(0).unwrap(),
            [ActionChange {
                action: Action::Node("B".to_string()),
                parent_amino_acid: 'M',
                amino_acid: 'K',
            }]
        );
    }

    #[test]
    fn test_unchanged_column_yields_nothing() {
        let analysis = analysis();
        assert!(analysis.find_changes_for_position(1).unwrap().is_empty());
    }

    #[test]
    fn test_change_deeper_in_followed_branch() {
        // Column 2 follows the (3, 4) pair; the change sits below module 3.
        let analysis = analysis();
        assert_eq!(
            analysis.find_changes_for_position(2).unwrap(),
            [ActionChange {
                action: Action::Node("D".to_string()),
                parent_amino_acid: 'T',
                amino_acid: 'S',
            }]
        );
    }

    #[test]
    fn test_find_changes_filters_by_action() {
        let analysis = analysis();
        assert_eq!(
            analysis
                .find_changes(&Action::Node("D".to_string()))
                .unwrap(),
            [PositionChange {
                index: 2,
                parent_amino_acid: 'T',
                amino_acid: 'S',
            }]
        );
        assert_eq!(
            analysis
                .find_changes(&Action::Node("B".to_string()))
                .unwrap(),
            [PositionChange {
                index: 0,
                parent_amino_acid: 'M',
                amino_acid: 'K',
            }]
        );
        assert!(analysis
            .find_changes(&Action::Node("A".to_string()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_position_out_of_range() {
        let analysis = analysis();
        assert!(analysis.find_changes_for_position(7).is_err());
    }
}
