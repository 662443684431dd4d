//! SafeBrowse analysis core.
//!
//! Two workflows back the extension popup:
//!
//! - [`WebsiteAnalysisWorkflow`] checks whether a site can be trusted
//! - [`DocumentAnalysisWorkflow`] summarizes the legal risk in a pasted or
//!   uploaded document
//!
//! Both sit on [`AnalysisRunner`], a small state machine
//! (`Idle → Running(p) → Completed | Failed`) that validates input, runs
//! one injected capability at a time and publishes every transition.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use safebrowse_core::{AnalysisContext, RiskLevel, WebsiteAnalysisWorkflow};
//! use safebrowse_core::canned::{CannedRiskAnalyzer, StaticBrowserContext};
//!
//! let mut workflow = WebsiteAnalysisWorkflow::new(
//!     Arc::new(CannedRiskAnalyzer::new(RiskLevel::Caution)),
//!     Arc::new(StaticBrowserContext::default()),
//!     AnalysisContext::new(),
//! );
//! workflow.set_url("https://example.com");
//! let result = workflow.analyze()?.await?;
//! println!("{}", workflow.category().label());
//! ```
//!
//! # Modules
//!
//! - [`runner`] - Shared state machine, progress reporting, events
//! - [`workflows`] - Website and document workflows
//! - [`traits`] - Capability traits (analyzer, summarizer, browser context)
//! - [`types`] - Requests, results, settings
//! - [`canned`] - Offline capabilities with fixed answers
//! - [`testing`] - Mock capabilities for tests

pub mod canned;
pub mod credentials;
pub mod error;
pub mod runner;
pub mod testing;
pub mod traits;
pub mod types;
pub mod workflows;

// Re-export core types at crate root
pub use credentials::ApiCredential;
pub use error::{AnalysisError, AnalysisResult, NoActiveTab, Result, WorkflowError};
pub use runner::{
    AnalysisRunner, AnalysisState, FailureReason, ProgressReporter, RunHandle, RunId,
    RunnerEvent, RunnerEventKind, StateWatcher,
};
pub use traits::{
    analyzer::WebsiteRiskAnalyzer, browser::BrowserContextProvider,
    summarizer::DocumentSummarizer,
};
pub use types::{
    document::{DocumentReport, DocumentSummary, InputMode, SUMMARY_DISCLAIMER},
    request::{
        AnalysisRequest, DocumentRequest, DocumentSource, FileHandle, Validate, WebsiteRequest,
        MIN_TEXT_CHARS,
    },
    settings::{AnalysisContext, Settings},
    website::{
        DetailRow, RiskCategory, RiskLevel, Tone, WebsiteAnalysisResult, WebsiteDetails,
        WebsiteReport,
    },
};
pub use workflows::{DocumentAnalysisWorkflow, WebsiteAnalysisWorkflow};
