//! Commit history extraction via git2.
//!
//! [`CommitSource`] wraps an open repository and hands out commits reachable
//! from HEAD as a lazy, pull-based iterator, plus the local branches and
//! single-commit lookups the branch classifier needs. Nothing is cached
//! between calls: every [`CommitSource::head_commits`] performs a fresh walk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{BranchType, DiffFindOptions, DiffOptions, ErrorCode, Oid, Patch, Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vcanalyze_core::AnalyzeError;

/// A commit materialized from the object database.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use vcanalyze_history::source::{Commit, Identity};
///
/// let when = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
/// let commit = Commit {
///     id: "abc123".into(),
///     author: Identity { name: "alice".into(), email: "alice@example.com".into() },
///     author_time: when,
///     committer_time: when,
///     message: "fix: auth bug".into(),
///     message_size: 13,
///     parents: vec![],
///     changes: vec![],
/// };
/// assert!(!commit.is_merge());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full hex object id.
    pub id: String,
    /// Author identity.
    pub author: Identity,
    /// When the change was authored.
    pub author_time: DateTime<Utc>,
    /// When the commit object was written.
    pub committer_time: DateTime<Utc>,
    /// Full commit message, lossily decoded.
    pub message: String,
    /// Length of the raw message in bytes.
    pub message_size: usize,
    /// Parent object ids, first parent first.
    pub parents: Vec<String>,
    /// Files changed relative to the first parent.
    pub changes: Vec<FileChange>,
}

impl Commit {
    /// Whether this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Name and email of a commit author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// A single file change within a commit.
///
/// # Examples
///
/// ```
/// use vcanalyze_history::source::FileChange;
///
/// let change = FileChange {
///     path: "src/main.rs".into(),
///     lines_added: 10,
///     lines_removed: 3,
/// };
/// assert_eq!(change.lines_added, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Path relative to the repository root. Deleted files keep their old path.
    pub path: String,
    /// Lines added in this commit.
    pub lines_added: u64,
    /// Lines removed in this commit.
    pub lines_removed: u64,
}

/// A local branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRef {
    /// Short branch name, e.g. `main`.
    pub name: String,
    /// Hex id of the tip commit.
    pub tip: String,
}

/// How much of each commit to materialize.
///
/// Diffing every commit against its parent dominates traversal cost, so
/// passes that only look at metadata should ask for [`ChangeDetail::Skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeDetail {
    /// Compute per-file changes with line counts.
    #[default]
    Full,
    /// Leave [`Commit::changes`] empty.
    Skip,
}

/// Read-only handle on a repository.
pub struct CommitSource {
    repo: Repository,
    path: PathBuf,
}

impl CommitSource {
    /// Open the repository at `path`.
    ///
    /// HEAD is resolved eagerly, so a source that opens successfully always
    /// has at least one commit to walk.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::RepositoryNotFound`] if `path` holds no
    /// repository, or [`AnalyzeError::HeadNotFound`] if HEAD does not
    /// resolve to a commit (e.g. a freshly initialized repository).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use vcanalyze_history::source::CommitSource;
    ///
    /// let source = CommitSource::open(Path::new(".")).unwrap();
    /// for commit in source.head_commits().unwrap() {
    ///     let commit = commit.unwrap();
    ///     println!("{} {}", &commit.id[..8], commit.author.name);
    /// }
    /// ```
    pub fn open(path: &Path) -> Result<Self, AnalyzeError> {
        let repo = Repository::open(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "failed to open repository");
            AnalyzeError::RepositoryNotFound(path.to_path_buf())
        })?;
        let source = Self {
            repo,
            path: path.to_path_buf(),
        };
        let head = source.head_oid()?;
        debug!(path = %path.display(), head = %head, "opened repository");
        Ok(source)
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk every commit reachable from HEAD, with full file changes.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::HeadNotFound`] if HEAD no longer resolves, or
    /// [`AnalyzeError::Traversal`] if the walk cannot be set up. Failures
    /// during the walk surface as `Err` items.
    pub fn head_commits(&self) -> Result<HeadCommits<'_>, AnalyzeError> {
        self.head_commits_with(ChangeDetail::Full)
    }

    /// Walk every commit reachable from HEAD.
    ///
    /// Commits come newest first by committer time, starting with the head
    /// commit itself; each ancestor appears exactly once. The iterator is
    /// single-use: call again for a fresh traversal.
    ///
    /// # Errors
    ///
    /// Same as [`CommitSource::head_commits`].
    pub fn head_commits_with(
        &self,
        detail: ChangeDetail,
    ) -> Result<HeadCommits<'_>, AnalyzeError> {
        let head = self.head_oid()?;
        let mut walk = self
            .repo
            .revwalk()
            .map_err(|e| AnalyzeError::Traversal(format!("failed to create revwalk: {e}")))?;
        walk.set_sorting(Sort::TIME)
            .map_err(|e| AnalyzeError::Traversal(format!("failed to set walk order: {e}")))?;
        walk.push(head)
            .map_err(|e| AnalyzeError::Traversal(format!("failed to push HEAD: {e}")))?;

        Ok(HeadCommits {
            repo: &self.repo,
            walk,
            detail,
            visited: 0,
        })
    }

    /// The commit HEAD currently resolves to, without file changes.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::HeadNotFound`] if HEAD does not resolve.
    pub fn head_commit(&self) -> Result<Commit, AnalyzeError> {
        let head = self.head_oid()?;
        load_commit(&self.repo, head, ChangeDetail::Skip)
    }

    /// List local branches with their tip commits, sorted by name.
    ///
    /// Symbolic branches (`refs/heads/alias -> refs/heads/main`) report the
    /// tip of the branch they resolve to.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Traversal`] if the references cannot be read,
    /// or [`AnalyzeError::CommitNotFound`] for a branch that does not resolve
    /// to an object.
    pub fn branches(&self) -> Result<Vec<BranchRef>, AnalyzeError> {
        let iter = self
            .repo
            .branches(Some(BranchType::Local))
            .map_err(|e| AnalyzeError::Traversal(format!("failed to list branches: {e}")))?;

        let mut branches = Vec::new();
        for item in iter {
            let (branch, _) =
                item.map_err(|e| AnalyzeError::Traversal(format!("failed to read branch: {e}")))?;
            let name = branch
                .name_bytes()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .map_err(|e| AnalyzeError::Traversal(format!("failed to read branch name: {e}")))?;
            let tip = branch
                .get()
                .resolve()
                .map_err(|e| match e.code() {
                    ErrorCode::NotFound => {
                        AnalyzeError::CommitNotFound(format!("tip of branch '{name}'"))
                    }
                    _ => AnalyzeError::Traversal(format!("failed to resolve branch {name}: {e}")),
                })?
                .target()
                .ok_or_else(|| AnalyzeError::CommitNotFound(format!("tip of branch '{name}'")))?;
            branches.push(BranchRef {
                name,
                tip: tip.to_string(),
            });
        }

        branches.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = branches.len(), "listed local branches");
        Ok(branches)
    }

    /// Resolve a single commit by its full hex id, with file changes.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::CommitNotFound`] if `id` is malformed or
    /// unknown.
    pub fn commit_at(&self, id: &str) -> Result<Commit, AnalyzeError> {
        self.commit_at_with(id, ChangeDetail::Full)
    }

    /// Resolve a single commit by its full hex id.
    ///
    /// # Errors
    ///
    /// Same as [`CommitSource::commit_at`].
    pub fn commit_at_with(&self, id: &str, detail: ChangeDetail) -> Result<Commit, AnalyzeError> {
        let oid = Oid::from_str(id).map_err(|_| AnalyzeError::CommitNotFound(id.to_string()))?;
        load_commit(&self.repo, oid, detail)
    }

    fn head_oid(&self) -> Result<Oid, AnalyzeError> {
        let head = self
            .repo
            .head()
            .map_err(|e| AnalyzeError::HeadNotFound(e.message().to_string()))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| AnalyzeError::HeadNotFound(e.message().to_string()))?;
        Ok(commit.id())
    }
}

/// Lazy iterator over the commits reachable from HEAD.
///
/// Yields `Err` once for a failed read; callers aggregating history should
/// stop at the first error rather than fold a partial result.
pub struct HeadCommits<'repo> {
    repo: &'repo Repository,
    walk: git2::Revwalk<'repo>,
    detail: ChangeDetail,
    visited: usize,
}

impl Iterator for HeadCommits<'_> {
    type Item = Result<Commit, AnalyzeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match self.walk.next() {
            Some(Ok(oid)) => oid,
            Some(Err(e)) => {
                return Some(Err(AnalyzeError::Traversal(format!("revwalk error: {e}"))));
            }
            None => {
                debug!(commits = self.visited, "history walk finished");
                return None;
            }
        };
        self.visited += 1;
        Some(load_commit(self.repo, oid, self.detail))
    }
}

fn load_commit(repo: &Repository, oid: Oid, detail: ChangeDetail) -> Result<Commit, AnalyzeError> {
    let commit = repo.find_commit(oid).map_err(|e| {
        if e.code() == ErrorCode::NotFound {
            AnalyzeError::CommitNotFound(oid.to_string())
        } else {
            AnalyzeError::Traversal(format!("failed to read commit {oid}: {e}"))
        }
    })?;

    let author = commit.author();
    let identity = Identity {
        name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
    };
    let author_time = to_utc(author.when().seconds(), oid)?;
    let committer_time = to_utc(commit.committer().when().seconds(), oid)?;

    let raw_message = commit.message_bytes();
    let changes = match detail {
        ChangeDetail::Full => extract_file_changes(repo, &commit)?,
        ChangeDetail::Skip => Vec::new(),
    };

    Ok(Commit {
        id: oid.to_string(),
        author: identity,
        author_time,
        committer_time,
        message: String::from_utf8_lossy(raw_message).into_owned(),
        message_size: raw_message.len(),
        parents: commit.parent_ids().map(|p| p.to_string()).collect(),
        changes,
    })
}

fn to_utc(seconds: i64, oid: Oid) -> Result<DateTime<Utc>, AnalyzeError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        AnalyzeError::Traversal(format!("commit {oid} has an out-of-range timestamp"))
    })
}

fn extract_file_changes(
    repo: &Repository,
    commit: &git2::Commit,
) -> Result<Vec<FileChange>, AnalyzeError> {
    let commit_tree = commit
        .tree()
        .map_err(|e| AnalyzeError::Traversal(format!("failed to get commit tree: {e}")))?;

    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit
            .parent(0)
            .map_err(|e| AnalyzeError::Traversal(format!("failed to get parent: {e}")))?;
        Some(
            parent
                .tree()
                .map_err(|e| AnalyzeError::Traversal(format!("failed to get parent tree: {e}")))?,
        )
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit_tree),
            Some(&mut diff_opts),
        )
        .map_err(|e| AnalyzeError::Traversal(format!("failed to compute diff: {e}")))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| AnalyzeError::Traversal(format!("failed to find renames: {e}")))?;

    let mut changes = Vec::with_capacity(diff.deltas().len());
    for (idx, delta) in diff.deltas().enumerate() {
        let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
            continue;
        };
        let path = path.to_string_lossy().into_owned();

        // Binary files have no patch and therefore no line counts.
        let (lines_added, lines_removed) = match Patch::from_diff(&diff, idx)
            .map_err(|e| AnalyzeError::Traversal(format!("failed to build patch for {path}: {e}")))?
        {
            Some(patch) => {
                let (_, added, removed) = patch.line_stats().map_err(|e| {
                    AnalyzeError::Traversal(format!("failed to count lines in {path}: {e}"))
                })?;
                (added as u64, removed as u64)
            }
            None => (0, 0),
        };

        changes.push(FileChange {
            path,
            lines_added,
            lines_removed,
        });
    }

    Ok(changes)
}
