use std::path::PathBuf;

/// Errors that can occur while analyzing a repository.
///
/// The first four variants come from the history engine itself and are
/// always fatal to the call that produced them: no partial aggregate is ever
/// returned alongside one. The rest are ambient failures of the front end.
/// Library crates use this type directly; the binary renders it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use vcanalyze_core::AnalyzeError;
///
/// let err = AnalyzeError::CommitNotFound("deadbeef".into());
/// assert!(err.to_string().contains("deadbeef"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AnalyzeError {
    /// No valid repository metadata exists at the path.
    #[error("not a git repository: {}", .0.display())]
    #[diagnostic(
        code(vc_analyze::repository_not_found),
        help("point vc-analyze at the root of a git working tree or a bare repository")
    )]
    RepositoryNotFound(PathBuf),

    /// HEAD cannot be resolved to a commit, e.g. an unborn branch.
    #[error("cannot resolve HEAD: {0}")]
    #[diagnostic(
        code(vc_analyze::head_not_found),
        help("the repository has no commits yet, or HEAD points at a missing branch")
    )]
    HeadNotFound(String),

    /// A referenced commit identifier is unknown to the repository.
    #[error("commit not found: {0}")]
    #[diagnostic(code(vc_analyze::commit_not_found))]
    CommitNotFound(String),

    /// The object database failed while walking history.
    #[error("history traversal failed: {0}")]
    #[diagnostic(code(vc_analyze::traversal))]
    Traversal(String),

    /// A path given on the command line does not exist.
    #[error("repository path does not exist: {}", .0.display())]
    #[diagnostic(code(vc_analyze::path_not_found))]
    PathNotFound(PathBuf),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
