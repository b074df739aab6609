//! Heuristic detection of undesirable history shapes.
//!
//! Three independent signals are computed in one fused pass: how many
//! commits carry oversized messages, whether any merge commit exists, and
//! whether any commit lies further than a cadence threshold from the head
//! commit. None of the signals implies another.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vcanalyze_core::{AnalyzeError, ThresholdConfig};

use crate::source::{ChangeDetail, Commit, CommitSource};

/// Options for anti-pattern detection.
///
/// Defaults come from [`ThresholdConfig::default`].
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use vcanalyze_history::antipatterns::AntiPatternOptions;
///
/// let opts = AntiPatternOptions::default();
/// assert_eq!(opts.large_message_bytes, 1000);
/// assert_eq!(opts.max_gap_from_head, Duration::days(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntiPatternOptions {
    /// Messages longer than this many bytes are large.
    pub large_message_bytes: usize,
    /// Committer-time distance from the head commit that counts as
    /// infrequent.
    pub max_gap_from_head: Duration,
}

impl From<&ThresholdConfig> for AntiPatternOptions {
    fn from(thresholds: &ThresholdConfig) -> Self {
        Self {
            large_message_bytes: thresholds.large_message_bytes,
            max_gap_from_head: Duration::days(i64::from(thresholds.infrequent_gap_days)),
        }
    }
}

impl Default for AntiPatternOptions {
    fn default() -> Self {
        Self::from(&ThresholdConfig::default())
    }
}

/// Anti-pattern signals for one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiPatternReport {
    /// Commits whose message exceeds the size threshold.
    pub large_commit_count: usize,
    /// At least one commit has more than one parent.
    pub merge_commits_detected: bool,
    /// At least one commit is further than the cadence threshold from head.
    pub infrequent_commits_detected: bool,
}

/// Scan a commit sequence against the head commit's committer time.
///
/// The cadence check compares every commit with `head_time`, not with its
/// temporal neighbour. With rebased or otherwise non-chronological history
/// this can flag repositories whose adjacent commits are close together.
///
/// # Errors
///
/// Propagates the first error yielded by `commits`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use vcanalyze_history::antipatterns::{scan, AntiPatternOptions};
/// use vcanalyze_history::source::{Commit, Identity};
///
/// let now = Utc::now();
/// let commit = |age: i64, parents: usize| Commit {
///     id: format!("{age}"),
///     author: Identity { name: "alice".into(), email: "a@example.com".into() },
///     author_time: now - Duration::days(age),
///     committer_time: now - Duration::days(age),
///     message: "msg".into(),
///     message_size: 3,
///     parents: vec!["p".into(); parents],
///     changes: vec![],
/// };
///
/// let history = vec![Ok(commit(0, 2)), Ok(commit(30, 1))];
/// let report = scan(now, history, &AntiPatternOptions::default()).unwrap();
/// assert!(report.merge_commits_detected);
/// assert!(report.infrequent_commits_detected);
/// assert_eq!(report.large_commit_count, 0);
/// ```
pub fn scan<I>(
    head_time: DateTime<Utc>,
    commits: I,
    options: &AntiPatternOptions,
) -> Result<AntiPatternReport, AnalyzeError>
where
    I: IntoIterator<Item = Result<Commit, AnalyzeError>>,
{
    let mut report = AntiPatternReport::default();

    for commit in commits {
        let commit = commit?;

        if commit.message_size > options.large_message_bytes {
            report.large_commit_count += 1;
        }
        if commit.is_merge() {
            report.merge_commits_detected = true;
        }
        if head_time - commit.committer_time > options.max_gap_from_head {
            report.infrequent_commits_detected = true;
        }
    }

    Ok(report)
}

/// Detect anti-patterns across all history reachable from HEAD.
///
/// # Errors
///
/// Returns [`AnalyzeError::HeadNotFound`] if HEAD does not resolve, or any
/// error raised while walking history.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use vcanalyze_history::antipatterns::{detect_anti_patterns, AntiPatternOptions};
/// use vcanalyze_history::source::CommitSource;
///
/// let source = CommitSource::open(Path::new(".")).unwrap();
/// let report = detect_anti_patterns(&source, &AntiPatternOptions::default()).unwrap();
/// println!("{} large commits", report.large_commit_count);
/// ```
pub fn detect_anti_patterns(
    source: &CommitSource,
    options: &AntiPatternOptions,
) -> Result<AntiPatternReport, AnalyzeError> {
    let head = source.head_commit()?;
    let report = scan(
        head.committer_time,
        source.head_commits_with(ChangeDetail::Skip)?,
        options,
    )?;
    debug!(
        large = report.large_commit_count,
        merges = report.merge_commits_detected,
        infrequent = report.infrequent_commits_detected,
        "anti-pattern scan finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Identity;
    use chrono::TimeZone;

    fn head_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn make_commit(message_size: usize, parents: usize, committed: DateTime<Utc>) -> Commit {
        Commit {
            id: format!("{message_size}-{}", committed.timestamp()),
            author: Identity {
                name: "alice".into(),
                email: "alice@example.com".into(),
            },
            author_time: committed,
            committer_time: committed,
            message: "x".repeat(message_size),
            message_size,
            parents: (0..parents).map(|i| format!("parent{i}")).collect(),
            changes: vec![],
        }
    }

    fn run(commits: Vec<Commit>) -> AntiPatternReport {
        scan(
            head_time(),
            commits.into_iter().map(Ok),
            &AntiPatternOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn only_messages_over_threshold_are_large() {
        let report = run(vec![
            make_commit(1001, 1, head_time()),
            make_commit(1000, 1, head_time()),
        ]);
        assert_eq!(report.large_commit_count, 1);
    }

    #[test]
    fn every_large_commit_is_counted() {
        let report = run(vec![
            make_commit(5000, 1, head_time()),
            make_commit(1001, 1, head_time()),
            make_commit(10, 0, head_time()),
        ]);
        assert_eq!(report.large_commit_count, 2);
    }

    #[test]
    fn single_merge_sets_flag() {
        let report = run(vec![
            make_commit(10, 1, head_time()),
            make_commit(10, 2, head_time()),
            make_commit(10, 0, head_time()),
        ]);
        assert!(report.merge_commits_detected);
        assert!(!report.infrequent_commits_detected);
        assert_eq!(report.large_commit_count, 0);
    }

    #[test]
    fn linear_recent_history_is_clean() {
        let report = run(vec![
            make_commit(10, 1, head_time()),
            make_commit(10, 1, head_time() - Duration::days(3)),
            make_commit(10, 0, head_time() - Duration::days(7)),
        ]);
        assert_eq!(report, AntiPatternReport::default());
    }

    #[test]
    fn gap_beyond_seven_days_from_head_is_infrequent() {
        let report = run(vec![
            make_commit(10, 1, head_time()),
            make_commit(10, 0, head_time() - Duration::days(7) - Duration::seconds(1)),
        ]);
        assert!(report.infrequent_commits_detected);
    }

    #[test]
    fn cadence_is_measured_from_head_not_neighbours() {
        // Each adjacent pair is two days apart, but the oldest commit is
        // eight days behind head.
        let report = run(vec![
            make_commit(10, 1, head_time()),
            make_commit(10, 1, head_time() - Duration::days(2)),
            make_commit(10, 1, head_time() - Duration::days(4)),
            make_commit(10, 1, head_time() - Duration::days(6)),
            make_commit(10, 0, head_time() - Duration::days(8)),
        ]);
        assert!(report.infrequent_commits_detected);
    }

    #[test]
    fn commits_newer_than_head_never_flag_cadence() {
        // Rebased history: an ancestor committed well after head.
        let report = run(vec![
            make_commit(10, 1, head_time()),
            make_commit(10, 0, head_time() + Duration::days(30)),
        ]);
        assert!(!report.infrequent_commits_detected);
    }

    #[test]
    fn options_follow_configured_thresholds() {
        let thresholds = ThresholdConfig {
            large_message_bytes: 10,
            infrequent_gap_days: 3,
            ..ThresholdConfig::default()
        };
        let opts = AntiPatternOptions::from(&thresholds);
        assert_eq!(opts.large_message_bytes, 10);
        assert_eq!(opts.max_gap_from_head, Duration::days(3));

        let report = scan(
            head_time(),
            vec![Ok(make_commit(11, 1, head_time() - Duration::days(4)))],
            &opts,
        )
        .unwrap();
        assert_eq!(report.large_commit_count, 1);
        assert!(report.infrequent_commits_detected);
    }

    #[test]
    fn error_aborts_scan() {
        let items = vec![
            Ok(make_commit(2000, 1, head_time())),
            Err(AnalyzeError::Traversal("bad object".into())),
        ];
        let err = scan(head_time(), items, &AntiPatternOptions::default()).unwrap_err();
        assert!(matches!(err, AnalyzeError::Traversal(_)));
    }
}
