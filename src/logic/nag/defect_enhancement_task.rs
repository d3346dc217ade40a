//! Defect / Enhancement / Task check
//!
//! Flags open bugs whose declared type disagrees with a confident model
//! prediction.
//!
//! Report order:
//! 1. declared `defect` (planned to be retyped automatically)
//! 2. predicted `defect` (enhancement/task are often confused with each
//!    other, a hidden defect matters more)
//! 3. everything else
//!
//! then by confidence and id, both descending.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::runner::{get_summary, BugbugScript};
use super::{NagCheck, ReportRow};
use crate::config::NagConfig;
use crate::error::{NagError, NagResult};
use crate::logic::bugzilla::{Bug, BugSource, BzParams};
use crate::logic::dates;
use crate::logic::model::{BugClassifier, BugType};

pub const TOOL_NAME: &str = "defectenhancementtask";

pub const DESCRIPTION: &str = "[Using ML] Check that the bug type is the same as predicted by bugbug";

pub const COLUMNS: [&str; 5] = ["id", "summary", "type", "bugbug_type", "confidence"];

// ============================================================================
// RESULT ROW
// ============================================================================

/// A confident prediction that disagrees with the bug's declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchResult {
    pub id: u64,
    pub summary: String,

    /// Declared type, as found on the bug
    #[serde(rename = "type")]
    pub bug_type: String,

    /// Predicted type
    pub bugbug_type: BugType,

    /// Top-class probability, as a percentage
    pub confidence: u8,
}

impl MismatchResult {
    /// Display bucket: 0 shown first
    pub fn priority(&self) -> u8 {
        if self.bug_type == BugType::Defect.as_str() {
            0
        } else if self.bugbug_type == BugType::Defect {
            1
        } else {
            2
        }
    }
}

impl ReportRow for MismatchResult {
    fn values(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.summary.clone(),
            self.bug_type.clone(),
            self.bugbug_type.to_string(),
            self.confidence.to_string(),
        ]
    }
}

/// Priority bucket, then confidence and id descending.
/// Ids are unique, so no two rows of one report compare equal.
pub fn compare_rows(a: &MismatchResult, b: &MismatchResult) -> Ordering {
    fn key(row: &MismatchResult) -> (u8, Reverse<u8>, Reverse<u64>) {
        (row.priority(), Reverse(row.confidence), Reverse(row.id))
    }
    key(a).cmp(&key(b))
}

// ============================================================================
// SCORING
// ============================================================================

/// Index and value of the largest probability; first one wins on ties
pub fn argmax(probs: ArrayView1<'_, f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &p) in probs.iter().enumerate() {
        match best {
            Some((_, top)) if p <= top => {}
            _ if p.is_nan() => {}
            _ => best = Some((index, p)),
        }
    }
    best
}

/// Probability to an integer percentage, halves to even
pub fn to_percentage(probability: f32) -> u8 {
    (100.0 * probability).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Keep the bugs whose prediction is confident (`>= threshold`) and differs
/// from the declared type.
///
/// Every prediction is decoded and checked against the label set first;
/// a label outside it fails the whole call.
pub fn find_mismatches<M: BugClassifier>(
    model: &M,
    bugs: &[Bug],
    probs: &Array2<f32>,
    confidence_threshold: f32,
) -> NagResult<HashMap<u64, MismatchResult>> {
    if bugs.len() != probs.nrows() {
        return Err(NagError::ShapeMismatch {
            bugs: bugs.len(),
            probs: probs.nrows(),
        });
    }

    let mut results = HashMap::new();

    for (bug, prob) in bugs.iter().zip(probs.rows()) {
        let (index, top) = argmax(prob).ok_or_else(|| {
            NagError::Model(format!("No class probabilities for bug {}", bug.id))
        })?;
        let suggestion: BugType = model.decode_label(index)?.parse()?;

        if top < confidence_threshold {
            tracing::debug!("Bug {}: {} at {:.3} below threshold", bug.id, suggestion, top);
            continue;
        }

        if bug.bug_type == suggestion.as_str() {
            continue;
        }

        results.insert(
            bug.id,
            MismatchResult {
                id: bug.id,
                summary: get_summary(bug),
                bug_type: bug.bug_type.clone(),
                bugbug_type: suggestion,
                confidence: to_percentage(top),
            },
        );
    }

    Ok(results)
}

// ============================================================================
// CHECK
// ============================================================================

pub struct DefectEnhancementTask<S, M> {
    script: BugbugScript<S, M>,
    config: NagConfig,
    today: chrono::NaiveDate,
}

impl<S: BugSource, M: BugClassifier> DefectEnhancementTask<S, M> {
    pub fn new(script: BugbugScript<S, M>, config: NagConfig) -> Self {
        Self {
            script,
            config,
            today: dates::today(),
        }
    }

    /// Pin the date `today` resolves to
    pub fn with_today(mut self, today: chrono::NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &NagConfig {
        &self.config
    }

    pub fn script(&self) -> &BugbugScript<S, M> {
        &self.script
    }
}

impl<S: BugSource, M: BugClassifier> NagCheck for DefectEnhancementTask<S, M> {
    type Row = MismatchResult;

    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    fn get_bz_params(&self, date: &str) -> NagResult<BzParams> {
        let (start_date, _) = dates::get_dates(date, self.config.days_lookup, self.today)?;
        let reporter_blacklist = self.config.reporter_blacklist.join(",");

        let params = [
            // Ignore closed bugs.
            ("bug_status", "__open__".to_string()),
            // Check only recently opened bugs.
            ("f1", "creation_ts".to_string()),
            ("o1", "greaterthan".to_string()),
            ("v1", dates::format_ymd(start_date)),
            ("f2", "reporter".to_string()),
            ("o2", "nowords".to_string()),
            ("v2", reporter_blacklist),
        ];

        Ok(params
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect())
    }

    fn sort_columns(&self) -> fn(&MismatchResult, &MismatchResult) -> Ordering {
        compare_rows
    }

    fn get_bugs(&self, date: &str, bug_ids: &[u64]) -> NagResult<HashMap<u64, MismatchResult>> {
        let (bugs, probs) = self.script.get_bugs(self.get_bz_params(date)?, bug_ids)?;
        if bugs.is_empty() {
            return Ok(HashMap::new());
        }

        let results = find_mismatches(
            self.script.model(),
            &bugs,
            &probs,
            self.config.confidence_threshold,
        )?;

        tracing::info!("{} of {} bugs have a mismatching type", results.len(), bugs.len());
        Ok(results)
    }
}
