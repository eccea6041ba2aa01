use crate::ancestral_state::Inherited;
use crate::cache::Memo;
use crate::error::Result;
use crate::layout_graph::LayoutGraph;
use crate::report::Report;
use crate::sequence_logo::PositionLogo;
use crate::serialize_dag::TreeEntry;
use crate::serialize_plan::PlanEntry;
use std::cell::OnceCell;
use std::collections::HashMap;

/// A report plus every memoization table for the facts derived from it.
///
/// All derived values are pure functions of `(report, args...)`; the tables
/// here make repeated evaluation idempotent and cheap. The caches live
/// exactly as long as this object and are never invalidated (the report is
/// immutable). Interior mutability keeps the whole read API on `&self`;
/// evaluation is single-threaded and synchronous throughout.
///
/// The derived-fact methods are implemented in the component modules:
/// `dependency_graph`, `ancestral_state`, `sequence_logo`, `serialize_dag`,
/// `serialize_plan`, `find_changes` and `layout_graph`.
#[derive(Debug, Default)]
pub struct ReportAnalysis {
    report: Report,
    pub(crate) reachable_memo: Memo<(String, String), Result<bool>>,
    pub(crate) topological_memo: OnceCell<Result<Vec<String>>>,
    pub(crate) dependencies_memo: Memo<String, Result<Vec<String>>>,
    pub(crate) interesting_memo: Memo<String, Result<Vec<usize>>>,
    pub(crate) inherited_memo: Memo<usize, Result<HashMap<String, Inherited>>>,
    pub(crate) logo_memo: OnceCell<Vec<PositionLogo>>,
    pub(crate) dependencies_tree_memo: Memo<String, Result<Vec<TreeEntry>>>,
    pub(crate) sequence_tree_memo: Memo<usize, Result<Vec<TreeEntry>>>,
    pub(crate) dependants_tree_memo: Memo<String, Result<Vec<TreeEntry>>>,
    pub(crate) plan_memo: Memo<(usize, Option<usize>, Option<usize>), Result<Vec<PlanEntry>>>,
    pub(crate) has_target_memo: Memo<(usize, usize), Result<bool>>,
    pub(crate) dependency_view_memo: Memo<Option<String>, Result<LayoutGraph>>,
    pub(crate) inheritance_view_memo: Memo<usize, Result<LayoutGraph>>,
}

impl ReportAnalysis {
    pub fn new(report: Report) -> Self {
        Self {
            report,
            ..Default::default()
        }
    }

    /// Loads and validates a report document, ready for analysis.
    pub fn from_json_file(filename: &str) -> anyhow::Result<Self> {
        let report = Report::from_json_file(filename)?;
        report.validate()?;
        Ok(Self::new(report))
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}
