//! Testing utilities including mock capabilities.
//!
//! These let hosts and tests drive the workflows deterministically without
//! any reputation service or language model behind them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use url::Url;

use crate::error::{AnalysisError, AnalysisResult};
use crate::runner::ProgressReporter;
use crate::traits::{analyzer::WebsiteRiskAnalyzer, summarizer::DocumentSummarizer};
use crate::types::document::DocumentSummary;
use crate::types::request::DocumentSource;
use crate::types::settings::AnalysisContext;
use crate::types::website::{RiskLevel, WebsiteAnalysisResult, WebsiteDetails};

/// Holds a mock capability until the test lets it through.
///
/// Each `release` lets exactly one waiting (or future) call continue.
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    pub async fn wait(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// A mock analyzer returning configured verdicts.
#[derive(Clone, Default)]
pub struct MockRiskAnalyzer {
    default: Arc<Mutex<Option<WebsiteAnalysisResult>>>,
    queued: Arc<Mutex<VecDeque<AnalysisResult<WebsiteAnalysisResult>>>>,
    gate: Option<Gate>,
    calls: Arc<Mutex<Vec<AnalyzerCall>>>,
}

/// Record of a call made to the mock analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerCall {
    pub url: Url,
    pub enhanced_protection: bool,
}

impl MockRiskAnalyzer {
    /// Answers `Safe` unless configured otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Result returned once the queue is empty.
    pub fn with_default(self, result: WebsiteAnalysisResult) -> Self {
        *self.default.lock().unwrap() = Some(result);
        self
    }

    /// Queue a result for the next call.
    pub fn then_return(self, result: WebsiteAnalysisResult) -> Self {
        self.queued.lock().unwrap().push_back(Ok(result));
        self
    }

    /// Queue a failure for the next call.
    pub fn then_fail(self, error: AnalysisError) -> Self {
        self.queued.lock().unwrap().push_back(Err(error));
        self
    }

    /// Block every call on `gate`.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<AnalyzerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> AnalysisResult<WebsiteAnalysisResult> {
        if let Some(queued) = self.queued.lock().unwrap().pop_front() {
            return queued;
        }
        Ok(self
            .default
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(safe_result))
    }
}

fn safe_result() -> WebsiteAnalysisResult {
    WebsiteAnalysisResult {
        risk_level: RiskLevel::Safe,
        summary: "No risk factors found.".to_string(),
        details: WebsiteDetails {
            https_enabled: true,
            domain_age_description: "10 years".to_string(),
            impersonation_suspected: false,
            reported_as_scam: false,
        },
        warnings: vec![],
    }
}

#[async_trait]
impl WebsiteRiskAnalyzer for MockRiskAnalyzer {
    async fn analyze(
        &self,
        url: &Url,
        context: &AnalysisContext,
    ) -> AnalysisResult<WebsiteAnalysisResult> {
        self.calls.lock().unwrap().push(AnalyzerCall {
            url: url.clone(),
            enhanced_protection: context.enhanced_protection,
        });
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.next_response()
    }
}

/// A mock summarizer that reports scripted progress.
#[derive(Clone, Default)]
pub struct MockSummarizer {
    steps: Vec<u8>,
    default: Arc<Mutex<Option<DocumentSummary>>>,
    queued: Arc<Mutex<VecDeque<AnalysisResult<DocumentSummary>>>>,
    gate: Option<Gate>,
    calls: Arc<Mutex<Vec<SummarizerCall>>>,
}

/// Record of a call made to the mock summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizerCall {
    File { name: String, bytes: usize },
    Text { chars: usize },
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress values reported, in order, before the call finishes.
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = u8>) -> Self {
        self.steps = steps.into_iter().collect();
        self
    }

    pub fn with_default(self, summary: DocumentSummary) -> Self {
        *self.default.lock().unwrap() = Some(summary);
        self
    }

    pub fn then_return(self, summary: DocumentSummary) -> Self {
        self.queued.lock().unwrap().push_back(Ok(summary));
        self
    }

    pub fn then_fail(self, error: AnalysisError) -> Self {
        self.queued.lock().unwrap().push_back(Err(error));
        self
    }

    /// Block every call on `gate` after its progress steps.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<SummarizerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> AnalysisResult<DocumentSummary> {
        if let Some(queued) = self.queued.lock().unwrap().pop_front() {
            return queued;
        }
        Ok(self.default.lock().unwrap().clone().unwrap_or_else(|| {
            DocumentSummary::new("## Key Points\n\n1. **Mock**\n   - Nothing notable")
        }))
    }
}

#[async_trait]
impl DocumentSummarizer for MockSummarizer {
    async fn summarize(
        &self,
        source: &DocumentSource,
        _context: &AnalysisContext,
        progress: &ProgressReporter,
    ) -> AnalysisResult<DocumentSummary> {
        let call = match source {
            DocumentSource::File(file) => SummarizerCall::File {
                name: file.name.clone(),
                bytes: file.len(),
            },
            DocumentSource::Text(text) => SummarizerCall::Text {
                chars: text.chars().count(),
            },
        };
        self.calls.lock().unwrap().push(call);

        for step in &self.steps {
            progress.report(*step);
        }
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.next_response()
    }
}
