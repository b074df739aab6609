use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;
use crate::Result;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = ".vc-analyze.toml";

/// Top-level configuration loaded from `.vc-analyze.toml`.
///
/// Supports layered resolution: `--config` path > local config > defaults.
///
/// # Examples
///
/// ```
/// use vcanalyze_core::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.thresholds.large_message_bytes, 1000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Heuristic thresholds for the history detectors.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Io`] if the file cannot be read, or
    /// [`AnalyzeError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vcanalyze_core::AnalyzerConfig;
    /// use std::path::Path;
    ///
    /// let config = AnalyzerConfig::from_file(Path::new(".vc-analyze.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcanalyze_core::AnalyzerConfig;
    ///
    /// let toml = r#"
    /// [thresholds]
    /// bottleneck_threshold = 5
    /// "#;
    /// let config = AnalyzerConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.thresholds.bottleneck_threshold, 5);
    /// assert_eq!(config.thresholds.inactive_branch_days, 90);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

/// Thresholds used by the anti-pattern, branch, and bottleneck detectors.
///
/// Every comparison against these values is strict: a message of exactly
/// `large_message_bytes` is not large, a branch exactly `inactive_branch_days`
/// old is already inactive, and a file needs more than
/// `bottleneck_threshold` touching commits to be reported.
///
/// # Examples
///
/// ```
/// use vcanalyze_core::ThresholdConfig;
///
/// let t = ThresholdConfig::default();
/// assert_eq!(t.infrequent_gap_days, 7);
/// assert_eq!(t.inactive_branch_days, 90);
/// assert_eq!(t.bottleneck_threshold, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Commit messages longer than this many bytes count as large (default: 1000).
    #[serde(default = "default_large_message_bytes")]
    pub large_message_bytes: usize,
    /// Gap from the head commit, in days, that flags infrequent commits (default: 7).
    #[serde(default = "default_infrequent_gap_days")]
    pub infrequent_gap_days: u32,
    /// Branches whose tip is at least this many days old are inactive (default: 90).
    #[serde(default = "default_inactive_branch_days")]
    pub inactive_branch_days: u32,
    /// Files touched by more than this many commits are bottlenecks (default: 2).
    #[serde(default = "default_bottleneck_threshold")]
    pub bottleneck_threshold: usize,
}

impl ThresholdConfig {
    fn validate(&self) -> Result<()> {
        if self.inactive_branch_days == 0 {
            return Err(AnalyzeError::Config(
                "thresholds.inactive_branch_days must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_large_message_bytes() -> usize {
    1000
}

fn default_infrequent_gap_days() -> u32 {
    7
}

fn default_inactive_branch_days() -> u32 {
    90
}

fn default_bottleneck_threshold() -> usize {
    2
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            large_message_bytes: default_large_message_bytes(),
            infrequent_gap_days: default_infrequent_gap_days(),
            inactive_branch_days: default_inactive_branch_days(),
            bottleneck_threshold: default_bottleneck_threshold(),
        }
    }
}
