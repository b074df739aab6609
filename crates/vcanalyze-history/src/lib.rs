//! Git history analysis: author activity, message sizes, branch health,
//! churn bottlenecks, and history anti-patterns.
//!
//! Every analysis walks the commits reachable from HEAD through a
//! [`source::CommitSource`] and returns plain values. Nothing is cached
//! between calls, so running an analysis twice against an unchanged
//! repository yields identical results.

pub mod aggregate;
pub mod antipatterns;
pub mod bottlenecks;
pub mod branches;
pub mod source;

use vcanalyze_core::AnalyzeError;

use crate::aggregate::{CommitSizeStats, HistoryStats};
use crate::source::{ChangeDetail, CommitSource};

/// Walk history from HEAD once and fold it into [`HistoryStats`].
///
/// # Errors
///
/// Returns any error raised while opening the walk or reading a commit.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use vcanalyze_history::analyze_history;
/// use vcanalyze_history::source::CommitSource;
///
/// let source = CommitSource::open(Path::new(".")).unwrap();
/// let stats = analyze_history(&source).unwrap();
/// for author in stats.sorted_authors() {
///     println!("{}: {} commits", author.author, author.count);
/// }
/// ```
pub fn analyze_history(source: &CommitSource) -> Result<HistoryStats, AnalyzeError> {
    let stats = aggregate::aggregate(source.head_commits()?)?;
    tracing::debug!(
        path = %source.path().display(),
        commits = stats.total_commits,
        authors = stats.author_counts.len(),
        files = stats.file_changes.len(),
        "aggregated history"
    );
    Ok(stats)
}

/// Walk history from HEAD once and total commit message sizes.
///
/// Commits are read without diffing, so this is much cheaper than
/// [`analyze_history`] on large repositories.
///
/// # Errors
///
/// Returns any error raised while opening the walk or reading a commit.
pub fn analyze_commit_sizes(source: &CommitSource) -> Result<CommitSizeStats, AnalyzeError> {
    let size = aggregate::commit_sizes(source.head_commits_with(ChangeDetail::Skip)?)?;
    tracing::debug!(
        path = %source.path().display(),
        commits = size.commit_count,
        bytes = size.total_size,
        "totalled commit message sizes"
    );
    Ok(size)
}
