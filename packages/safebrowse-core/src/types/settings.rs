//! User settings and the subset the workflows read.
//!
//! Storage is the host's job. These types only describe the values and
//! their defaults.

use serde::{Deserialize, Serialize};

use crate::credentials::ApiCredential;

/// Extension settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scan sites automatically on visit.
    pub auto_scan: bool,
    /// Alert on high-risk sites.
    pub show_notifications: bool,
    pub dark_mode: bool,
    /// Ask analyzers for their additional checks.
    pub enhanced_protection: bool,
    /// Prevent access to sites rated `Danger`.
    pub block_high_risk: bool,
    /// Key for the summarization service. Read on load, never written out.
    #[serde(skip_serializing)]
    pub openai_api_key: Option<ApiCredential>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_scan: true,
            show_notifications: true,
            dark_mode: false,
            enhanced_protection: true,
            block_high_risk: false,
            openai_api_key: None,
        }
    }
}

impl Settings {
    pub fn context(&self) -> AnalysisContext {
        AnalysisContext {
            enhanced_protection: self.enhanced_protection,
            credential: self.openai_api_key.clone(),
        }
    }
}

/// What the workflows hand to every capability call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisContext {
    pub enhanced_protection: bool,
    pub credential: Option<ApiCredential>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enhanced_protection(mut self, enabled: bool) -> Self {
        self.enhanced_protection = enabled;
        self
    }

    pub fn with_credential(mut self, credential: impl Into<ApiCredential>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

impl From<&Settings> for AnalysisContext {
    fn from(settings: &Settings) -> Self {
        settings.context()
    }
}
