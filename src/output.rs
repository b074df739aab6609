//! Rendering of analysis results as text, markdown, or JSON.
//!
//! The text layout is line-for-line stable; scripts that scrape
//! `vc-analyze` output depend on it.

use std::fmt::Write;

use serde_json::{json, Value};
use vcanalyze_core::{AnalyzeError, OutputFormat};
use vcanalyze_history::aggregate::{CommitSizeStats, HistoryStats};
use vcanalyze_history::antipatterns::AntiPatternReport;
use vcanalyze_history::bottlenecks::Bottleneck;
use vcanalyze_history::branches::BranchActivity;

/// One renderable analysis result.
pub enum Report<'a> {
    History(&'a HistoryStats),
    CommitSize(&'a CommitSizeStats),
    Branches(&'a BranchActivity),
    AntiPatterns {
        report: &'a AntiPatternReport,
        gap_days: u32,
    },
    Bottlenecks {
        files: &'a [Bottleneck],
        threshold: usize,
    },
}

impl Report<'_> {
    /// Key under which this section appears in combined JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Report::History(_) => "history",
            Report::CommitSize(_) => "commitSize",
            Report::Branches(_) => "branches",
            Report::AntiPatterns { .. } => "antiPatterns",
            Report::Bottlenecks { .. } => "bottlenecks",
        }
    }

    /// Render in `format`. JSON output is pretty-printed.
    pub fn render(&self, format: OutputFormat) -> Result<String, AnalyzeError> {
        match format {
            OutputFormat::Text => Ok(self.text()),
            OutputFormat::Markdown => Ok(self.markdown()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.json()?)?),
        }
    }

    /// Structured value for JSON output.
    pub fn json(&self) -> Result<Value, AnalyzeError> {
        let value = match self {
            Report::History(stats) => json!({
                "totalCommits": stats.total_commits,
                "authors": stats.sorted_authors(),
            }),
            Report::CommitSize(size) => json!({
                "totalCommits": size.commit_count,
                "totalSize": size.total_size,
                "averageSize": size.average(),
            }),
            Report::Branches(activity) => serde_json::to_value(activity)?,
            Report::AntiPatterns { report, .. } => serde_json::to_value(report)?,
            Report::Bottlenecks { files, threshold } => json!({
                "threshold": threshold,
                "files": files,
            }),
        };
        Ok(value)
    }

    fn text(&self) -> String {
        let mut out = String::new();
        match self {
            Report::History(stats) => {
                let _ = writeln!(out, "Commit history analysis:\n");
                let _ = writeln!(out, "Total number of commits: {}\n", stats.total_commits);
                let _ = writeln!(
                    out,
                    "Number of commits by each author (in decreasing order):"
                );
                for author in stats.sorted_authors() {
                    let _ = writeln!(out, "{}: {} commits", author.author, author.count);
                }
            }
            Report::CommitSize(size) => {
                let _ = writeln!(out, "Total number of commits: {}", size.commit_count);
                let _ = writeln!(out, "Total commit message size: {} bytes", size.total_size);
                match size.average() {
                    Some(avg) => {
                        let _ = writeln!(out, "Average commit size: {avg:.2} bytes");
                    }
                    None => {
                        let _ = writeln!(out, "Average commit size: no commits");
                    }
                }
            }
            Report::Branches(activity) => {
                let _ = writeln!(out, "Branch analysis:\n");
                let _ = writeln!(out, "Branches:");
                for (name, status) in &activity.branches {
                    let _ = writeln!(out, "{name}: {status}");
                }
                let _ = writeln!(out, "\nActive branches: {}", activity.active_count);
                let _ = writeln!(out, "Inactive branches: {}", activity.inactive_count);
            }
            Report::AntiPatterns { report, gap_days } => {
                let _ = writeln!(out, "Detecting anti-patterns...");
                if report.large_commit_count > 0 {
                    let _ = writeln!(
                        out,
                        "Detected {} large commit(s).",
                        report.large_commit_count
                    );
                } else {
                    let _ = writeln!(out, "No large commits detected.");
                }
                if report.merge_commits_detected {
                    let _ = writeln!(out, "Merge commits detected.");
                } else {
                    let _ = writeln!(out, "No merge commits detected.");
                }
                if report.infrequent_commits_detected {
                    let _ = writeln!(
                        out,
                        "Detected infrequent commits (more than {gap_days} days between commits)."
                    );
                } else {
                    let _ = writeln!(out, "No infrequent commit patterns detected.");
                }
                let _ = writeln!(out, "Anti-pattern detection complete.");
            }
            Report::Bottlenecks { files, threshold } => {
                if files.is_empty() {
                    let _ = writeln!(out, "No bottleneck files detected.");
                } else {
                    let _ = writeln!(
                        out,
                        "Bottleneck files (changed in more than {threshold} commits):"
                    );
                    for file in files.iter() {
                        let _ = writeln!(out, "{}: {} changes", file.path, file.changes);
                    }
                }
            }
        }
        out
    }

    fn markdown(&self) -> String {
        let mut out = String::new();
        match self {
            Report::History(stats) => {
                let _ = writeln!(out, "## Commit History\n");
                let _ = writeln!(out, "**Total commits:** {}\n", stats.total_commits);
                let authors = stats.sorted_authors();
                if !authors.is_empty() {
                    let _ = writeln!(out, "| Author | Commits |");
                    let _ = writeln!(out, "|--------|---------|");
                    for author in authors {
                        let _ = writeln!(out, "| {} | {} |", author.author, author.count);
                    }
                }
            }
            Report::CommitSize(size) => {
                let _ = writeln!(out, "## Commit Message Size\n");
                let _ = writeln!(out, "- **Total commits:** {}", size.commit_count);
                let _ = writeln!(out, "- **Total message size:** {} bytes", size.total_size);
                match size.average() {
                    Some(avg) => {
                        let _ = writeln!(out, "- **Average size:** {avg:.2} bytes");
                    }
                    None => {
                        let _ = writeln!(out, "- **Average size:** no commits");
                    }
                }
            }
            Report::Branches(activity) => {
                let _ = writeln!(out, "## Branches\n");
                let _ = writeln!(out, "| Branch | Status |");
                let _ = writeln!(out, "|--------|--------|");
                for (name, status) in &activity.branches {
                    let _ = writeln!(out, "| `{name}` | {status} |");
                }
                let _ = writeln!(
                    out,
                    "\n**Active:** {} · **Inactive:** {}",
                    activity.active_count, activity.inactive_count
                );
            }
            Report::AntiPatterns { report, gap_days } => {
                let _ = writeln!(out, "## Anti-Patterns\n");
                let _ = writeln!(out, "| Check | Result |");
                let _ = writeln!(out, "|-------|--------|");
                let _ = writeln!(
                    out,
                    "| Large commit messages | {} |",
                    report.large_commit_count
                );
                let _ = writeln!(
                    out,
                    "| Merge commits | {} |",
                    yes_no(report.merge_commits_detected)
                );
                let _ = writeln!(
                    out,
                    "| Gaps over {gap_days} days from HEAD | {} |",
                    yes_no(report.infrequent_commits_detected)
                );
            }
            Report::Bottlenecks { files, threshold } => {
                let _ = writeln!(out, "## Bottlenecks\n");
                if files.is_empty() {
                    let _ = writeln!(out, "No bottleneck files detected.");
                } else {
                    let _ = writeln!(out, "Files changed in more than {threshold} commits:\n");
                    let _ = writeln!(out, "| File | Changes |");
                    let _ = writeln!(out, "|------|---------|");
                    for file in files.iter() {
                        let _ = writeln!(out, "| `{}` | {} |", file.path, file.changes);
                    }
                }
            }
        }
        out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcanalyze_history::branches::BranchStatus;

    fn stats_with(authors: &[(&str, usize)]) -> HistoryStats {
        let mut stats = HistoryStats::default();
        for (name, count) in authors {
            stats.author_counts.insert(name.to_string(), *count);
            stats.total_commits += count;
        }
        stats
    }

    #[test]
    fn history_text_layout() {
        let stats = stats_with(&[("Alice", 3), ("Bob", 2)]);
        let text = Report::History(&stats).render(OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Commit history analysis:\n\
             \n\
             Total number of commits: 5\n\
             \n\
             Number of commits by each author (in decreasing order):\n\
             Alice: 3 commits\n\
             Bob: 2 commits\n"
        );
    }

    #[test]
    fn commit_size_text_layout() {
        let size = CommitSizeStats {
            total_size: 250,
            commit_count: 5,
        };
        let text = Report::CommitSize(&size).render(OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Total number of commits: 5\n\
             Total commit message size: 250 bytes\n\
             Average commit size: 50.00 bytes\n"
        );
    }

    #[test]
    fn commit_size_without_commits_has_no_average() {
        let text = Report::CommitSize(&CommitSizeStats::default())
            .render(OutputFormat::Text)
            .unwrap();
        assert!(text.ends_with("Average commit size: no commits\n"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn branches_text_layout() {
        let mut activity = BranchActivity::default();
        activity
            .branches
            .insert("main".into(), BranchStatus::Active);
        activity.active_count = 1;
        let text = Report::Branches(&activity).render(OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Branch analysis:\n\
             \n\
             Branches:\n\
             main: Active\n\
             \n\
             Active branches: 1\n\
             Inactive branches: 0\n"
        );
    }

    #[test]
    fn anti_pattern_text_lines() {
        let report = AntiPatternReport {
            large_commit_count: 2,
            merge_commits_detected: false,
            infrequent_commits_detected: true,
        };
        let text = Report::AntiPatterns {
            report: &report,
            gap_days: 7,
        }
        .render(OutputFormat::Text)
        .unwrap();
        assert_eq!(
            text,
            "Detecting anti-patterns...\n\
             Detected 2 large commit(s).\n\
             No merge commits detected.\n\
             Detected infrequent commits (more than 7 days between commits).\n\
             Anti-pattern detection complete.\n"
        );
    }

    #[test]
    fn bottleneck_text_lines() {
        let files = vec![Bottleneck {
            path: "src/main.rs".into(),
            changes: 4,
        }];
        let text = Report::Bottlenecks {
            files: &files,
            threshold: 2,
        }
        .render(OutputFormat::Text)
        .unwrap();
        assert_eq!(
            text,
            "Bottleneck files (changed in more than 2 commits):\nsrc/main.rs: 4 changes\n"
        );

        let none = Report::Bottlenecks {
            files: &[],
            threshold: 2,
        }
        .render(OutputFormat::Text)
        .unwrap();
        assert_eq!(none, "No bottleneck files detected.\n");
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let report = AntiPatternReport {
            large_commit_count: 1,
            merge_commits_detected: true,
            infrequent_commits_detected: false,
        };
        let rendered = Report::AntiPatterns {
            report: &report,
            gap_days: 7,
        }
        .render(OutputFormat::Json)
        .unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["largeCommitCount"], 1);
        assert_eq!(parsed["mergeCommitsDetected"], true);
    }

    #[test]
    fn json_history_lists_sorted_authors() {
        let stats = stats_with(&[("Bob", 1), ("Alice", 4)]);
        let value = Report::History(&stats).json().unwrap();
        assert_eq!(value["totalCommits"], 5);
        assert_eq!(value["authors"][0]["author"], "Alice");
        assert_eq!(value["authors"][1]["count"], 1);
    }

    #[test]
    fn json_size_average_is_null_without_commits() {
        let value = Report::CommitSize(&CommitSizeStats::default())
            .json()
            .unwrap();
        assert!(value["averageSize"].is_null());
    }

    #[test]
    fn markdown_has_section_headings() {
        let stats = stats_with(&[("Alice", 1)]);
        let md = Report::History(&stats)
            .render(OutputFormat::Markdown)
            .unwrap();
        assert!(md.starts_with("## Commit History"));
        assert!(md.contains("| Alice | 1 |"));
    }
}
