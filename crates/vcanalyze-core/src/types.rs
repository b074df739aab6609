use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a report is written to stdout.
///
/// `Text` keeps the one-fact-per-line layout that shell scripts grep, so its
/// wording only changes deliberately. `Json` carries the same numbers as
/// structured data, and `Markdown` is meant for pasting into issues and
/// pull request descriptions.
///
/// Parsing is case-insensitive and accepts `md` for markdown:
///
/// ```
/// use vcanalyze_core::OutputFormat;
///
/// assert_eq!("MD".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Total number of commits: 3` style lines.
    #[default]
    Text,
    /// One object per report, camelCase keys.
    Json,
    /// Headed sections with tables.
    Markdown,
}

impl OutputFormat {
    /// Every accepted spelling, canonical names first.
    const NAMES: [(&'static str, OutputFormat); 4] = [
        ("text", OutputFormat::Text),
        ("json", OutputFormat::Json),
        ("markdown", OutputFormat::Markdown),
        ("md", OutputFormat::Markdown),
    ];
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = Self::NAMES
            .iter()
            .find(|(_, format)| format == self)
            .map_or("text", |(name, _)| *name);
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, format)| *format)
            .ok_or_else(|| {
                format!("unknown output format '{s}' (expected text, json, or markdown)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_shorthand_displays_canonical_name() {
        let format: OutputFormat = "md".parse().unwrap();
        assert_eq!(format.to_string(), "markdown");
    }

    #[test]
    fn unknown_format_error_lists_choices() {
        let err = "table".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("'table'"));
        assert!(err.contains("text, json, or markdown"));
    }

    #[test]
    fn serde_uses_the_cli_spelling() {
        let json = serde_json::to_string(&OutputFormat::Markdown).unwrap();
        assert_eq!(json, "\"markdown\"");
        let parsed: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(parsed, OutputFormat::Json);
    }
}
