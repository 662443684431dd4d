//! The two user-facing workflows. Both hold their UI-bound fields and turn
//! them into one immutable request when the user submits.

pub mod document;
pub mod website;

pub use document::DocumentAnalysisWorkflow;
pub use website::WebsiteAnalysisWorkflow;
