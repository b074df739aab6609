//! Change-frequency bottleneck detection.
//!
//! A bottleneck is a file touched by more commits than a fixed threshold,
//! used as a cheap proxy for where churn concentrates.

use serde::{Deserialize, Serialize};

use crate::aggregate::FileChangeFrequency;

/// A frequently changed file.
///
/// # Examples
///
/// ```
/// use vcanalyze_history::bottlenecks::Bottleneck;
///
/// let b = Bottleneck { path: "src/main.rs".into(), changes: 12 };
/// assert!(b.changes > 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    /// File path relative to repo root.
    pub path: String,
    /// Commits that touched the file.
    pub changes: usize,
}

/// Report every file whose change count strictly exceeds `threshold`.
///
/// Nothing is truncated. Results are sorted by change count descending,
/// then path ascending, mirroring the author ordering.
///
/// # Examples
///
/// ```
/// use vcanalyze_history::aggregate::FileChangeFrequency;
/// use vcanalyze_history::bottlenecks::detect_bottlenecks;
///
/// let freq: FileChangeFrequency = vec![
///     ("hot.rs".to_string(), 3),
///     ("warm.rs".to_string(), 2),
/// ]
/// .into_iter()
/// .collect();
///
/// let found = detect_bottlenecks(&freq, 2);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].path, "hot.rs");
/// ```
pub fn detect_bottlenecks(frequency: &FileChangeFrequency, threshold: usize) -> Vec<Bottleneck> {
    let mut bottlenecks: Vec<Bottleneck> = frequency
        .iter()
        .filter(|(_, changes)| *changes > threshold)
        .map(|(path, changes)| Bottleneck {
            path: path.to_string(),
            changes,
        })
        .collect();

    bottlenecks.sort_by(|a, b| b.changes.cmp(&a.changes).then_with(|| a.path.cmp(&b.path)));
    bottlenecks
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcanalyze_core::ThresholdConfig;

    fn frequency(entries: &[(&str, usize)]) -> FileChangeFrequency {
        entries
            .iter()
            .map(|(path, count)| (path.to_string(), *count))
            .collect()
    }

    #[test]
    fn three_touches_qualify_two_do_not() {
        let freq = frequency(&[("three.rs", 3), ("two.rs", 2)]);
        let found = detect_bottlenecks(&freq, ThresholdConfig::default().bottleneck_threshold);
        assert_eq!(
            found,
            vec![Bottleneck {
                path: "three.rs".into(),
                changes: 3
            }]
        );
    }

    #[test]
    fn all_qualifying_files_are_reported() {
        let entries: Vec<(String, usize)> = (0..50).map(|i| (format!("f{i}.rs"), 3 + i)).collect();
        let freq: FileChangeFrequency = entries.into_iter().collect();
        assert_eq!(detect_bottlenecks(&freq, 2).len(), 50);
    }

    #[test]
    fn sorted_by_changes_then_path() {
        let freq = frequency(&[("b.rs", 5), ("a.rs", 5), ("c.rs", 9), ("d.rs", 1)]);
        let paths: Vec<_> = detect_bottlenecks(&freq, 2)
            .into_iter()
            .map(|b| b.path)
            .collect();
        assert_eq!(paths, ["c.rs", "a.rs", "b.rs"]);
    }

    #[test]
    fn empty_frequency_has_no_bottlenecks() {
        assert!(detect_bottlenecks(&FileChangeFrequency::default(), 2).is_empty());
    }

    #[test]
    fn custom_threshold_is_strict() {
        let freq = frequency(&[("x.rs", 10)]);
        assert!(detect_bottlenecks(&freq, 10).is_empty());
        assert_eq!(detect_bottlenecks(&freq, 9).len(), 1);
    }
}
