//! Website trust check.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{Result, WorkflowError};
use crate::runner::{AnalysisRunner, AnalysisState, RunHandle, RunnerEvent, StateWatcher};
use crate::traits::{analyzer::WebsiteRiskAnalyzer, browser::BrowserContextProvider};
use crate::types::request::WebsiteRequest;
use crate::types::settings::AnalysisContext;
use crate::types::website::{RiskCategory, WebsiteAnalysisResult, WebsiteReport};

/// Holds the URL field and drives a `WebsiteRiskAnalyzer`.
pub struct WebsiteAnalysisWorkflow {
    analyzer: Arc<dyn WebsiteRiskAnalyzer>,
    browser: Arc<dyn BrowserContextProvider>,
    context: AnalysisContext,
    url: String,
    runner: AnalysisRunner<WebsiteAnalysisResult>,
}

impl WebsiteAnalysisWorkflow {
    pub fn new(
        analyzer: Arc<dyn WebsiteRiskAnalyzer>,
        browser: Arc<dyn BrowserContextProvider>,
        context: AnalysisContext,
    ) -> Self {
        Self {
            analyzer,
            browser,
            context,
            url: String::new(),
            runner: AnalysisRunner::new("website"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Fill the URL field from the active browser tab.
    ///
    /// On failure the field keeps its previous value.
    pub async fn use_current_tab(&mut self) -> Result<&str> {
        let url = self.browser.active_tab_url().await?;
        debug!(url = %url, "adopted active tab url");
        self.url = url;
        Ok(&self.url)
    }

    /// Whether the analyze action should be enabled.
    pub fn can_analyze(&self) -> bool {
        !self.runner.is_running() && !self.url.trim().is_empty()
    }

    /// Build the request from the current URL field.
    pub fn request(&self) -> Result<WebsiteRequest> {
        WebsiteRequest::parse(&self.url)
    }

    /// Start analyzing the current URL.
    pub fn analyze(&self) -> Result<RunHandle<WebsiteAnalysisResult>> {
        if self.runner.is_running() {
            return Err(WorkflowError::AlreadyRunning);
        }
        let request = self.request()?;

        let analyzer = Arc::clone(&self.analyzer);
        let context = self.context.clone();
        self.runner.run(request, move |request, _progress| async move {
            analyzer.analyze(&request.url, &context).await
        })
    }

    /// Cancel the in-flight analysis, if any.
    pub fn cancel(&self) -> bool {
        self.runner.cancel()
    }

    pub fn state(&self) -> AnalysisState<WebsiteAnalysisResult> {
        self.runner.state()
    }

    pub fn watch(&self) -> StateWatcher<WebsiteAnalysisResult> {
        self.runner.watch()
    }

    pub fn events(&self) -> broadcast::Receiver<RunnerEvent> {
        self.runner.events()
    }

    /// Display category for the latest result; `Unknown` until one exists.
    pub fn category(&self) -> RiskCategory {
        RiskCategory::for_result(self.state().result())
    }

    pub fn report(&self) -> Option<WebsiteReport> {
        self.state().result().map(WebsiteReport::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, NoActiveTab};
    use crate::testing::{Gate, MockRiskAnalyzer};
    use crate::traits::browser::MockBrowserContextProvider;
    use crate::types::website::{RiskLevel, WebsiteDetails};

    fn danger() -> WebsiteAnalysisResult {
        WebsiteAnalysisResult {
            risk_level: RiskLevel::Danger,
            summary: "Looks like a phishing page.".into(),
            details: WebsiteDetails {
                https_enabled: false,
                domain_age_description: "3 days".into(),
                impersonation_suspected: true,
                reported_as_scam: true,
            },
            warnings: vec!["Domain was registered recently".into()],
        }
    }

    fn workflow(analyzer: MockRiskAnalyzer) -> WebsiteAnalysisWorkflow {
        let mut browser = MockBrowserContextProvider::new();
        browser.expect_active_tab_url().never();
        WebsiteAnalysisWorkflow::new(
            Arc::new(analyzer),
            Arc::new(browser),
            AnalysisContext::new().with_enhanced_protection(true),
        )
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected_in_core() {
        let workflow = workflow(MockRiskAnalyzer::new());
        assert!(!workflow.can_analyze());

        let err = workflow.analyze().unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidInput { .. }));
        assert!(workflow.state().is_idle());
    }

    #[tokio::test]
    async fn test_danger_renders_as_potential_risk() {
        let analyzer = MockRiskAnalyzer::new().with_default(danger());
        let mut workflow = workflow(analyzer.clone());
        workflow.set_url("https://examp1e-login.com");
        assert_eq!(workflow.category(), RiskCategory::Unknown);

        let result = workflow.analyze().unwrap().await.unwrap();
        assert_eq!(result.risk_level, RiskLevel::Danger);

        let report = workflow.report().unwrap();
        assert_eq!(report.label, "Potential Risk Detected");
        assert_eq!(workflow.category(), RiskCategory::Danger);
        assert_ne!(report.category, RiskCategory::Safe);
        assert_ne!(report.category, RiskCategory::Caution);

        let calls = analyzer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url.as_str(), "https://examp1e-login.com/");
        assert!(calls[0].enhanced_protection);
    }

    #[tokio::test]
    async fn test_analyze_disabled_while_running() {
        let gate = Gate::new();
        let analyzer = MockRiskAnalyzer::new().with_gate(gate.clone());
        let mut workflow = workflow(analyzer);
        workflow.set_url("example.com");

        let handle = workflow.analyze().unwrap();
        assert!(!workflow.can_analyze());
        assert_eq!(workflow.analyze().unwrap_err(), WorkflowError::AlreadyRunning);

        gate.release();
        handle.await.unwrap();
        assert!(workflow.can_analyze());
    }

    #[tokio::test]
    async fn test_use_current_tab_fills_url() {
        let mut browser = MockBrowserContextProvider::new();
        browser
            .expect_active_tab_url()
            .times(1)
            .returning(|| Ok("https://example.com".to_string()));
        let mut workflow = WebsiteAnalysisWorkflow::new(
            Arc::new(MockRiskAnalyzer::new()),
            Arc::new(browser),
            AnalysisContext::new(),
        );

        assert_eq!(workflow.use_current_tab().await.unwrap(), "https://example.com");
        assert!(workflow.can_analyze());
    }

    #[tokio::test]
    async fn test_no_active_tab_keeps_url() {
        let mut browser = MockBrowserContextProvider::new();
        browser
            .expect_active_tab_url()
            .returning(|| Err(NoActiveTab::because("devtools focused")));
        let mut workflow = WebsiteAnalysisWorkflow::new(
            Arc::new(MockRiskAnalyzer::new()),
            Arc::new(browser),
            AnalysisContext::new(),
        );
        workflow.set_url("https://kept.example");

        let err = workflow.use_current_tab().await.unwrap_err();
        assert!(matches!(err, WorkflowError::NoActiveTab(_)));
        assert_eq!(workflow.url(), "https://kept.example");
    }

    #[tokio::test]
    async fn test_failure_keeps_no_result() {
        let analyzer =
            MockRiskAnalyzer::new().then_fail(AnalysisError::upstream("whois", "unreachable"));
        let mut workflow = workflow(analyzer);
        workflow.set_url("https://example.com");

        workflow.analyze().unwrap().await.unwrap_err();
        assert!(workflow.report().is_none());
        assert_eq!(workflow.category(), RiskCategory::Unknown);
        assert!(workflow.can_analyze());
    }
}
