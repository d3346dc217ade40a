//! Bugbug Script Runner
//!
//! Shared plumbing of the ML-backed nag checks: pull bugs from the tracker,
//! run them through the model, hand `(bugs, probabilities)` back to the
//! check.

use ndarray::Array2;

use crate::error::{NagError, NagResult};
use crate::logic::bugzilla::{Bug, BugSource, BzParams};
use crate::logic::model::BugClassifier;

/// Summary shown in place of a restricted bug's own
pub const HIDDEN_SUMMARY: &str = "...";

pub struct BugbugScript<S, M> {
    source: S,
    model: M,
}

impl<S: BugSource, M: BugClassifier> BugbugScript<S, M> {
    pub fn new(source: S, model: M) -> Self {
        Self { source, model }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Retrieve and classify bugs.
    ///
    /// Explicit `bug_ids` take precedence over the query; an empty slice
    /// means "use `bz_params`". Returns no probabilities (a `0 x 0` matrix)
    /// when nothing was retrieved, without touching the model.
    pub fn get_bugs(&self, bz_params: BzParams, bug_ids: &[u64]) -> NagResult<(Vec<Bug>, Array2<f32>)> {
        let bugs = if bug_ids.is_empty() {
            tracing::info!("Querying bugs with {} params", bz_params.len());
            self.source.search(&bz_params)?
        } else {
            tracing::info!("Fetching {} bugs by id", bug_ids.len());
            self.source.get_bugs(bug_ids)?
        };

        if bugs.is_empty() {
            tracing::info!("No bugs to analyze");
            return Ok((bugs, Array2::zeros((0, 0))));
        }

        let probs = self.model.classify(&bugs)?;
        if probs.nrows() != bugs.len() {
            return Err(NagError::ShapeMismatch {
                bugs: bugs.len(),
                probs: probs.nrows(),
            });
        }

        tracing::info!("Classified {} bugs into {} classes", probs.nrows(), probs.ncols());
        Ok((bugs, probs))
    }
}

/// Summary safe to put in a report
pub fn get_summary(bug: &Bug) -> String {
    if bug.is_restricted() {
        HIDDEN_SUMMARY.to_string()
    } else {
        bug.summary.clone()
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{bug, FakeModel, FakeSource};
    use super::*;

    fn params() -> BzParams {
        BzParams::from([("bug_status".to_string(), "__open__".to_string())])
    }

    #[test]
    fn test_query_mode_without_ids() {
        let script = BugbugScript::new(
            FakeSource::with_bugs(vec![bug(1, "defect")]),
            FakeModel::with_rows(vec![vec![0.1, 0.8, 0.1]]),
        );

        let (bugs, probs) = script.get_bugs(params(), &[]).unwrap();

        assert_eq!(bugs.len(), 1);
        assert_eq!(probs.dim(), (1, 3));
        assert_eq!(script.source().searches.borrow().len(), 1);
        assert!(script.source().id_requests.borrow().is_empty());
    }

    #[test]
    fn test_ids_take_precedence() {
        let script = BugbugScript::new(
            FakeSource::with_bugs(vec![bug(1, "defect"), bug(2, "task")]),
            FakeModel::with_rows(vec![vec![0.1, 0.8, 0.1]]),
        );

        let (bugs, _) = script.get_bugs(params(), &[2]).unwrap();

        assert_eq!(bugs.len(), 1);
        assert_eq!(bugs[0].id, 2);
        assert!(script.source().searches.borrow().is_empty());
        assert_eq!(*script.source().id_requests.borrow(), vec![vec![2]]);
    }

    #[test]
    fn test_empty_retrieval_skips_model() {
        let script = BugbugScript::new(FakeSource::default(), FakeModel::with_rows(vec![]));

        let (bugs, probs) = script.get_bugs(params(), &[]).unwrap();

        assert!(bugs.is_empty());
        assert_eq!(probs.nrows(), 0);
        assert_eq!(script.model().calls.get(), 0);
    }

    #[test]
    fn test_row_count_mismatch() {
        let script = BugbugScript::new(
            FakeSource::with_bugs(vec![bug(1, "defect"), bug(2, "task")]),
            FakeModel::with_rows(vec![vec![0.1, 0.8, 0.1]]),
        );

        assert!(matches!(
            script.get_bugs(params(), &[]),
            Err(NagError::ShapeMismatch { bugs: 2, probs: 1 })
        ));
    }

    #[test]
    fn test_restricted_summary_hidden() {
        let mut secret = bug(5, "defect");
        secret.groups = vec!["core-security".to_string()];

        assert_eq!(get_summary(&secret), HIDDEN_SUMMARY);
        assert_eq!(get_summary(&bug(6, "task")), "Bug 6");
    }
}
