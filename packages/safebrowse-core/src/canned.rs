//! Canned capabilities for offline demos.
//!
//! They reproduce what the browser extension shows while no real backend
//! is wired in: a fixed verdict after a short delay, and a stock terms of
//! service summary streamed in 5% steps.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{AnalysisError, AnalysisResult, NoActiveTab};
use crate::runner::ProgressReporter;
use crate::traits::{
    analyzer::WebsiteRiskAnalyzer, browser::BrowserContextProvider,
    summarizer::DocumentSummarizer,
};
use crate::types::document::DocumentSummary;
use crate::types::request::DocumentSource;
use crate::types::settings::AnalysisContext;
use crate::types::website::{RiskLevel, WebsiteAnalysisResult, WebsiteDetails};

const CANNED_SUMMARY: &str = "\
## Key Points in This Document

1. **Data Collection**
   - Your browsing history is collected
   - Personal information including name, email, and location is stored
   - Third-party cookies track your activity across websites

2. **Data Sharing**
   - Information is shared with advertising partners
   - Data may be sold to data brokers
   - Law enforcement can request access without warrant in some cases

3. **User Rights**
   - Limited ability to delete your data
   - Opt-out available for some tracking features
   - Changes to terms can happen without direct notification

4. **Potential Concerns**
   - Automatic renewal with 24-hour cancellation window
   - Dispute resolution limited to arbitration
   - Service can be terminated without prior notice
";

/// Returns the same verdict for every URL.
#[derive(Debug, Clone)]
pub struct CannedRiskAnalyzer {
    level: RiskLevel,
    delay: Duration,
}

impl CannedRiskAnalyzer {
    pub fn new(level: RiskLevel) -> Self {
        Self {
            level,
            delay: Duration::from_millis(1500),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl WebsiteRiskAnalyzer for CannedRiskAnalyzer {
    async fn analyze(
        &self,
        url: &Url,
        _context: &AnalysisContext,
    ) -> AnalysisResult<WebsiteAnalysisResult> {
        tokio::time::sleep(self.delay).await;

        let (summary, warnings) = match self.level {
            RiskLevel::Safe => ("No risk factors were found for this website.", vec![]),
            RiskLevel::Caution | RiskLevel::Danger => (
                "This website has some potential risk factors.",
                vec![
                    "Domain was registered recently".to_string(),
                    "Similar to known brand names".to_string(),
                ],
            ),
        };

        Ok(WebsiteAnalysisResult {
            risk_level: self.level,
            summary: summary.to_string(),
            details: WebsiteDetails {
                https_enabled: url.scheme() == "https",
                domain_age_description: "2 years".to_string(),
                impersonation_suspected: self.level == RiskLevel::Danger,
                reported_as_scam: false,
            },
            warnings,
        })
    }
}

/// Streams progress in fixed steps, then returns a stock summary.
#[derive(Debug, Clone)]
pub struct CannedSummarizer {
    step: u8,
    interval: Duration,
    settle: Duration,
}

impl CannedSummarizer {
    pub fn new() -> Self {
        Self {
            step: 5,
            interval: Duration::from_millis(200),
            settle: Duration::from_millis(1000),
        }
    }

    /// Pause between steps, and before returning the summary.
    pub fn with_timing(mut self, interval: Duration, settle: Duration) -> Self {
        self.interval = interval;
        self.settle = settle;
        self
    }
}

impl Default for CannedSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSummarizer for CannedSummarizer {
    async fn summarize(
        &self,
        source: &DocumentSource,
        _context: &AnalysisContext,
        progress: &ProgressReporter,
    ) -> AnalysisResult<DocumentSummary> {
        if let DocumentSource::File(file) = source {
            if file.is_empty() {
                return Err(AnalysisError::Parse(format!("{} is empty", file.name)));
            }
        }

        for percent in (0..=95).step_by(self.step as usize) {
            tokio::select! {
                _ = progress.cancelled() => {
                    return Err(AnalysisError::Rejected("cancelled".to_string()));
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
            progress.report(percent);
        }
        tokio::time::sleep(self.settle).await;

        Ok(DocumentSummary::new(CANNED_SUMMARY))
    }
}

/// Browser context with a fixed active tab, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticBrowserContext {
    url: Option<String>,
}

impl StaticBrowserContext {
    pub fn new(url: Option<String>) -> Self {
        Self { url }
    }
}

#[async_trait]
impl BrowserContextProvider for StaticBrowserContext {
    async fn active_tab_url(&self) -> Result<String, NoActiveTab> {
        self.url
            .clone()
            .ok_or_else(|| NoActiveTab::because("no browser attached"))
    }
}
