//! Website reputation capability.

use async_trait::async_trait;
use url::Url;

use crate::error::AnalysisResult;
use crate::types::settings::AnalysisContext;
use crate::types::website::WebsiteAnalysisResult;

/// Rates how trustworthy a website is.
///
/// Real implementations combine several checks: HTTPS, domain age lookup,
/// similarity to known brands (phishing), and scam-report databases. With
/// `context.enhanced_protection` set they may run slower, stricter checks.
///
/// Implementations enforce their own timeouts and report them as
/// `AnalysisError::Timeout`.
#[async_trait]
pub trait WebsiteRiskAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        url: &Url,
        context: &AnalysisContext,
    ) -> AnalysisResult<WebsiteAnalysisResult>;
}
