//! Legal document summary.
//!
//! The workflow keeps both input fields (selected file and pasted text)
//! and a mode toggle. Switching modes never touches either field; only the
//! active one is read when the request is built at submit time.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{Result, WorkflowError};
use crate::runner::{AnalysisRunner, AnalysisState, RunHandle, RunnerEvent, StateWatcher};
use crate::traits::summarizer::DocumentSummarizer;
use crate::types::document::{DocumentReport, DocumentSummary, InputMode};
use crate::types::request::{DocumentRequest, FileHandle, Validate};
use crate::types::settings::AnalysisContext;

pub struct DocumentAnalysisWorkflow {
    summarizer: Arc<dyn DocumentSummarizer>,
    context: AnalysisContext,
    mode: InputMode,
    file: Option<FileHandle>,
    text: String,
    runner: AnalysisRunner<DocumentSummary>,
}

impl DocumentAnalysisWorkflow {
    pub fn new(summarizer: Arc<dyn DocumentSummarizer>, context: AnalysisContext) -> Self {
        Self {
            summarizer,
            context,
            mode: InputMode::default(),
            file: None,
            text: String::new(),
            runner: AnalysisRunner::new("document"),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "input mode switched");
        }
        self.mode = mode;
    }

    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    pub fn select_file(&mut self, file: FileHandle) {
        self.file = Some(file);
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Whether the active mode's input is acceptable.
    ///
    /// Uses the same checks `analyze` applies, so an enabled action never
    /// fails with `InvalidInput`.
    pub fn input_is_valid(&self) -> bool {
        self.request()
            .and_then(|request| request.validate())
            .is_ok()
    }

    /// Whether the analyze action should be enabled.
    pub fn can_analyze(&self) -> bool {
        !self.runner.is_running() && self.input_is_valid()
    }

    /// Build the request from the active mode's field.
    pub fn request(&self) -> Result<DocumentRequest> {
        let request = match self.mode {
            InputMode::Upload => DocumentRequest::file(
                self.file
                    .clone()
                    .ok_or_else(|| WorkflowError::invalid_input("no file selected"))?,
            ),
            InputMode::Paste => DocumentRequest::text(self.text.clone()),
        };
        Ok(request)
    }

    /// Start summarizing the active input.
    pub fn analyze(&self) -> Result<RunHandle<DocumentSummary>> {
        if self.runner.is_running() {
            return Err(WorkflowError::AlreadyRunning);
        }
        let request = self.request()?;

        let summarizer = Arc::clone(&self.summarizer);
        let context = self.context.clone();
        self.runner.run(request, move |request, progress| async move {
            summarizer
                .summarize(&request.source, &context, &progress)
                .await
        })
    }

    /// Cancel the in-flight analysis, if any.
    pub fn cancel(&self) -> bool {
        self.runner.cancel()
    }

    pub fn state(&self) -> AnalysisState<DocumentSummary> {
        self.runner.state()
    }

    /// Progress of the current run; 100 once completed.
    pub fn progress(&self) -> Option<u8> {
        self.state().progress()
    }

    pub fn watch(&self) -> StateWatcher<DocumentSummary> {
        self.runner.watch()
    }

    pub fn events(&self) -> broadcast::Receiver<RunnerEvent> {
        self.runner.events()
    }

    /// The latest summary with its disclaimer. Only present when completed.
    pub fn report(&self) -> Option<DocumentReport> {
        match self.state() {
            AnalysisState::Completed(summary) => Some(DocumentReport::from(summary)),
            _ => None,
        }
    }
}
