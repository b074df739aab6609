//! Branch activity classification.
//!
//! Partitions local branches into active and inactive by the age of their
//! tip commit relative to an explicit reference time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vcanalyze_core::{AnalyzeError, ThresholdConfig};

use crate::source::{ChangeDetail, CommitSource};

/// Age at which a branch tip counts as inactive under `thresholds`.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use vcanalyze_core::ThresholdConfig;
/// use vcanalyze_history::branches::inactive_after;
///
/// assert_eq!(inactive_after(&ThresholdConfig::default()), Duration::days(90));
/// ```
pub fn inactive_after(thresholds: &ThresholdConfig) -> Duration {
    Duration::days(i64::from(thresholds.inactive_branch_days))
}

/// Whether a branch has seen recent commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchStatus {
    /// Tip committed less than the threshold ago.
    Active,
    /// Tip committed at or beyond the threshold.
    Inactive,
}

impl fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchStatus::Active => write!(f, "Active"),
            BranchStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

/// Classification of every local branch.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use vcanalyze_history::branches::{classify, BranchStatus};
///
/// let now = Utc::now();
/// let activity = classify(
///     vec![
///         ("main".to_string(), now),
///         ("old".to_string(), now - Duration::days(120)),
///     ],
///     now,
///     Duration::days(90),
/// );
/// assert_eq!(activity.branches["main"], BranchStatus::Active);
/// assert_eq!(activity.inactive_count, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchActivity {
    /// Status per branch name.
    pub branches: BTreeMap<String, BranchStatus>,
    /// Branches classified [`BranchStatus::Active`].
    pub active_count: usize,
    /// Branches classified [`BranchStatus::Inactive`].
    pub inactive_count: usize,
}

/// Classify a single tip.
///
/// The boundary is exclusive: a tip exactly `inactive_after` old is
/// inactive.
pub fn status_at(
    tip_time: DateTime<Utc>,
    reference: DateTime<Utc>,
    inactive_after: Duration,
) -> BranchStatus {
    if reference - tip_time < inactive_after {
        BranchStatus::Active
    } else {
        BranchStatus::Inactive
    }
}

/// Classify `(branch name, tip committer time)` pairs against `reference`.
pub fn classify<I>(tips: I, reference: DateTime<Utc>, inactive_after: Duration) -> BranchActivity
where
    I: IntoIterator<Item = (String, DateTime<Utc>)>,
{
    let mut activity = BranchActivity::default();
    for (name, tip_time) in tips {
        let status = status_at(tip_time, reference, inactive_after);
        match status {
            BranchStatus::Active => activity.active_count += 1,
            BranchStatus::Inactive => activity.inactive_count += 1,
        }
        activity.branches.insert(name, status);
    }
    activity
}

/// Classify every local branch of `source`.
///
/// All tips are resolved before anything is classified, so a single
/// unresolvable branch fails the whole call.
///
/// # Errors
///
/// Returns [`AnalyzeError::CommitNotFound`] if any branch tip cannot be
/// resolved, or [`AnalyzeError::Traversal`] if branches cannot be listed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use chrono::{Duration, Utc};
/// use vcanalyze_history::branches::classify_branches;
/// use vcanalyze_history::source::CommitSource;
///
/// let source = CommitSource::open(Path::new(".")).unwrap();
/// let activity = classify_branches(&source, Utc::now(), Duration::days(90)).unwrap();
/// println!("{} active, {} inactive", activity.active_count, activity.inactive_count);
/// ```
pub fn classify_branches(
    source: &CommitSource,
    reference: DateTime<Utc>,
    inactive_after: Duration,
) -> Result<BranchActivity, AnalyzeError> {
    let tips = source
        .branches()?
        .into_iter()
        .map(|branch| -> Result<_, AnalyzeError> {
            let tip = source.commit_at_with(&branch.tip, ChangeDetail::Skip)?;
            debug!(branch = %branch.name, tip = %branch.tip, "resolved branch tip");
            Ok((branch.name, tip.committer_time))
        })
        .collect::<Result<Vec<_>, AnalyzeError>>()?;

    Ok(classify(tips, reference, inactive_after))
}
