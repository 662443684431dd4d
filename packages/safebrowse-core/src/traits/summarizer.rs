//! Document summarization capability.

use async_trait::async_trait;

use crate::error::AnalysisResult;
use crate::runner::ProgressReporter;
use crate::types::document::DocumentSummary;
use crate::types::request::DocumentSource;
use crate::types::settings::AnalysisContext;

/// Summarizes the legal risk in a document.
///
/// For files this usually means PDF text extraction followed by a language
/// model call using `context.credential`.
///
/// Report progress through `progress` as work advances; the workflow shows
/// it while the run is in flight. Check `progress.is_cancelled()` between
/// expensive steps.
#[async_trait]
pub trait DocumentSummarizer: Send + Sync {
    async fn summarize(
        &self,
        source: &DocumentSource,
        context: &AnalysisContext,
        progress: &ProgressReporter,
    ) -> AnalysisResult<DocumentSummary>;
}
