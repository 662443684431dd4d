//! Document summaries.

use serde::{Deserialize, Serialize};

/// Attached to every displayed summary, whatever produced it.
pub const SUMMARY_DISCLAIMER: &str =
    "This is an AI-generated summary. Always review the original document for complete details.";

/// Which input the document workflow reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Upload,
    Paste,
}

/// Summarizer output: sectioned key points in markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub markdown_body: String,
}

impl DocumentSummary {
    pub fn new(markdown_body: impl Into<String>) -> Self {
        Self {
            markdown_body: markdown_body.into(),
        }
    }

    /// `## ` headings in order.
    pub fn sections(&self) -> Vec<&str> {
        self.markdown_body
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix("## "))
            .map(str::trim)
            .collect()
    }
}

/// Display-ready summary with the fixed disclaimer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub summary: DocumentSummary,
    pub disclaimer: &'static str,
}

impl From<DocumentSummary> for DocumentReport {
    fn from(summary: DocumentSummary) -> Self {
        Self {
            summary,
            disclaimer: SUMMARY_DISCLAIMER,
        }
    }
}
