//! Single-pass folding of commit history into author, size, and file stats.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use vcanalyze_core::AnalyzeError;

use crate::source::Commit;

/// Commit count attributed to one author display name.
///
/// Authors are keyed by name only: two identities sharing a display name are
/// merged, whatever their email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCommitCount {
    /// Author display name.
    pub author: String,
    /// Commits authored under that name.
    pub count: usize,
}

/// Total message size over a set of commits.
///
/// # Examples
///
/// ```
/// use vcanalyze_history::aggregate::CommitSizeStats;
///
/// let stats = CommitSizeStats { total_size: 250, commit_count: 5 };
/// assert_eq!(stats.average(), Some(50.0));
/// assert_eq!(CommitSizeStats::default().average(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSizeStats {
    /// Sum of message lengths in bytes.
    pub total_size: u64,
    /// Number of commits measured.
    pub commit_count: usize,
}

impl CommitSizeStats {
    /// Mean message size in bytes, or `None` when no commits were measured.
    pub fn average(&self) -> Option<f64> {
        (self.commit_count > 0).then(|| self.total_size as f64 / self.commit_count as f64)
    }

    fn record(&mut self, message_size: usize) {
        self.total_size += message_size as u64;
        self.commit_count += 1;
    }
}

/// Number of commits that touched each file.
///
/// A path is present only if at least one commit touched it, and a commit
/// counts once per path however many hunks it changed there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileChangeFrequency(HashMap<String, usize>);

impl FileChangeFrequency {
    /// Touch count for `path`, if it was ever changed.
    pub fn get(&self, path: &str) -> Option<usize> {
        self.0.get(path).copied()
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no file was touched.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(path, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(path, count)| (path.as_str(), *count))
    }

    fn record(&mut self, path: &str) {
        *self.0.entry(path.to_string()).or_default() += 1;
    }
}

impl FromIterator<(String, usize)> for FileChangeFrequency {
    /// Zero counts are dropped so the map never holds untouched paths.
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, count)| *count > 0).collect())
    }
}

/// Aggregates produced by one walk over history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Commits visited.
    pub total_commits: usize,
    /// Commits per author display name.
    pub author_counts: HashMap<String, usize>,
    /// Message size totals.
    pub size: CommitSizeStats,
    /// Commits per touched file.
    pub file_changes: FileChangeFrequency,
}

impl HistoryStats {
    /// Authors ordered by descending commit count, then name ascending.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcanalyze_history::aggregate::HistoryStats;
    ///
    /// let mut stats = HistoryStats::default();
    /// stats.author_counts.insert("bob".into(), 2);
    /// stats.author_counts.insert("carol".into(), 8);
    /// stats.author_counts.insert("alice".into(), 2);
    ///
    /// let names: Vec<_> = stats.sorted_authors().into_iter().map(|a| a.author).collect();
    /// assert_eq!(names, ["carol", "alice", "bob"]);
    /// ```
    pub fn sorted_authors(&self) -> Vec<AuthorCommitCount> {
        let mut authors: Vec<AuthorCommitCount> = self
            .author_counts
            .iter()
            .map(|(author, count)| AuthorCommitCount {
                author: author.clone(),
                count: *count,
            })
            .collect();
        authors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.author.cmp(&b.author)));
        authors
    }
}

/// Fold a commit sequence into [`HistoryStats`] in a single pass.
///
/// Stops at the first `Err` item and returns it; no partial aggregate
/// escapes.
///
/// # Errors
///
/// Propagates any error yielded by `commits`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use vcanalyze_history::aggregate::aggregate;
/// use vcanalyze_history::source::{Commit, Identity};
///
/// let commit = Commit {
///     id: "abc".into(),
///     author: Identity { name: "alice".into(), email: "alice@example.com".into() },
///     author_time: Utc::now(),
///     committer_time: Utc::now(),
///     message: "init".into(),
///     message_size: 4,
///     parents: vec![],
///     changes: vec![],
/// };
/// let stats = aggregate(vec![Ok(commit)]).unwrap();
/// assert_eq!(stats.total_commits, 1);
/// assert_eq!(stats.size.total_size, 4);
/// ```
pub fn aggregate<I>(commits: I) -> Result<HistoryStats, AnalyzeError>
where
    I: IntoIterator<Item = Result<Commit, AnalyzeError>>,
{
    let mut stats = HistoryStats::default();

    for commit in commits {
        let commit = commit?;

        *stats
            .author_counts
            .entry(commit.author.name.clone())
            .or_default() += 1;
        stats.size.record(commit.message_size);
        stats.total_commits += 1;

        let mut seen_paths: HashSet<&str> = HashSet::with_capacity(commit.changes.len());
        for change in &commit.changes {
            if seen_paths.insert(change.path.as_str()) {
                stats.file_changes.record(&change.path);
            }
        }
    }

    Ok(stats)
}

/// Fold a commit sequence into message size totals only.
///
/// Cheaper than [`aggregate`] when the caller does not need file changes,
/// since the commits can be read with
/// [`ChangeDetail::Skip`](crate::source::ChangeDetail::Skip).
///
/// # Errors
///
/// Propagates any error yielded by `commits`.
pub fn commit_sizes<I>(commits: I) -> Result<CommitSizeStats, AnalyzeError>
where
    I: IntoIterator<Item = Result<Commit, AnalyzeError>>,
{
    let mut size = CommitSizeStats::default();
    for commit in commits {
        size.record(commit?.message_size);
    }
    Ok(size)
}
