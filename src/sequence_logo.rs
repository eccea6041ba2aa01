use crate::analysis::ReportAnalysis;
use crate::GAP;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoCount {
    pub amino_acid: char,
    pub count: usize,
}

/// Letter frequencies for one alignment column, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionLogo {
    pub logo: Vec<LogoCount>,
}

impl ReportAnalysis {
    /// Per-column letter counts across the observed (leaf) sequences only,
    /// sorted descending by count. Ties keep the order in which the letters
    /// were first encountered.
    pub fn sequence_positions(&self) -> Vec<PositionLogo> {
        self.logo_memo
            .get_or_init(|| {
                let length = self.report().alignment_length();
                (0..length)
                    .map(|position| {
                        let mut counts: IndexMap<char, usize> = IndexMap::new();
                        for node in self.report().nodes.values() {
                            if node.is_leaf() {
                                let letter = node.amino_acid_at(position).unwrap_or(GAP);
                                *counts.entry(letter).or_insert(0) += 1;
                            }
                        }
                        let logo = counts
                            .into_iter()
                            .map(|(amino_acid, count)| LogoCount { amino_acid, count })
                            .sorted_by(|lhs, rhs| rhs.count.cmp(&lhs.count))
                            .collect();
                        PositionLogo { logo }
                    })
                    .collect()
            })
            .clone()
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
    fn test_counts_cover_leaves_only() {
        let analysis = analysis();
        let positions = analysis.sequence_positions();
        assert_eq!(positions.len(), 3);
        let leaf_count = analysis.report().leaf_ids().len();
        for position in &positions {
            let total: usize = position.logo.iter().map(|entry| entry.count).sum();
            assert_eq!(total, leaf_count);
        }
    }

    #[test]
    fn test_column_tallies() {
        let analysis = analysis();
        let positions = analysis.sequence_positions();
        // Leaves are C = "KCA" and D = "GC-".
        assert_eq!(
            positions[0].logo,
            [
                LogoCount {
                    amino_acid: 'K',
                    count: 1
                },
                LogoCount {
                    amino_acid: 'G',
                    count: 1
                }
            ]
        );
        assert_eq!(
            positions[1].logo,
            [LogoCount {
                amino_acid: 'C',
                count: 2
            }]
        );
        assert_eq!(
            positions[2].logo,
            [
                LogoCount {
                    amino_acid: 'A',
                    count: 1
                },
                LogoCount {
                    amino_acid: GAP,
                    count: 1
                }
            ]
        );
    }

    #[test]
    fn test_descending_with_stable_ties() {
        let mut report = sample_report();
        // Turn E into a leaf so column 0 counts K twice and G once.
        report.nodes.get_mut("E").unwrap().kind = crate::report::NodeKind::Leaf;
        let analysis = ReportAnalysis::new(report);
        let logo = &analysis.sequence_positions()[0].logo;
        assert_eq!(logo[0].amino_acid, 'K');
        assert_eq!(logo[0].count, 2);
        assert_eq!(logo[1].amino_acid, 'G');
    }
}
