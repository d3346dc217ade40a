//! Nag Module
//!
//! Periodic checks that look at recent bugs and produce a report for
//! triagers.
//!
//! ## Structure
//! - `runner`: retrieval + classification shared by the ML checks
//! - `defect_enhancement_task`: declared type vs. predicted type
//! - `report`: sorting and rendering of check results

pub mod defect_enhancement_task;
pub mod report;
pub mod runner;

pub use defect_enhancement_task::{DefectEnhancementTask, MismatchResult};
pub use report::{render_report, sorted_rows, ReportFormat};
pub use runner::{get_summary, BugbugScript};

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::NagResult;
use crate::logic::bugzilla::BzParams;

/// One line of a check's report
pub trait ReportRow: Serialize {
    /// Cell values, in the order of the check's `columns()`
    fn values(&self) -> Vec<String>;
}

/// Contract every nag check fulfils for the driver
pub trait NagCheck {
    type Row: ReportRow;

    /// Tool name, also the section name in the tools file
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn columns(&self) -> &'static [&'static str];

    /// Query constraints for a run on `date`
    fn get_bz_params(&self, date: &str) -> NagResult<BzParams>;

    /// Display order of report rows
    fn sort_columns(&self) -> fn(&Self::Row, &Self::Row) -> Ordering;

    /// Rows to report, keyed by bug id
    fn get_bugs(&self, date: &str, bug_ids: &[u64]) -> NagResult<HashMap<u64, Self::Row>>;
}
